//! Crop command: cut sanitized text to a length budget.

use camino::Utf8PathBuf;
use clap::Args;
use tracing::{debug, instrument};

use tgmark_core::{crop_report, sanitize_and_crop};

/// Arguments for the `crop` subcommand.
#[derive(Args, Debug)]
pub struct CropArgs {
    /// File to crop (reads stdin when omitted or `-`).
    pub file: Option<Utf8PathBuf>,

    /// Maximum length in chars.
    #[arg(long)]
    pub max: usize,

    /// Sanitize the input first and re-sanitize the cropped result.
    #[arg(long)]
    pub sanitize: bool,
}

/// Crop a file or stdin and print the result.
#[instrument(name = "cmd_crop", skip_all, fields(file = ?args.file, max = args.max))]
pub fn cmd_crop(args: CropArgs, global_json: bool, max_input: Option<usize>) -> anyhow::Result<()> {
    debug!(file = ?args.file, max = args.max, sanitize = args.sanitize, "executing crop command");

    let content = super::read_input(args.file.as_deref(), max_input)?;
    let report = if args.sanitize {
        sanitize_and_crop(&content, args.max)
    } else {
        crop_report(&content, args.max)
    };
    debug!(changed = report.changed, length = report.length, "cropped");

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.text);
    }

    Ok(())
}
