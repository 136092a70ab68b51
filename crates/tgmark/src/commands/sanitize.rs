//! Sanitize command: escape text for MarkdownV2.

use camino::Utf8PathBuf;
use clap::Args;
use serde::Serialize;
use tracing::{debug, instrument};

use tgmark_core::sanitize;

/// Arguments for the `sanitize` subcommand.
#[derive(Args, Debug, Default)]
pub struct SanitizeArgs {
    /// File to sanitize (reads stdin when omitted or `-`).
    pub file: Option<Utf8PathBuf>,
}

#[derive(Debug, Serialize)]
struct SanitizeReport {
    text: String,
    changed: bool,
    length: usize,
}

/// Sanitize a file or stdin and print the result.
#[instrument(name = "cmd_sanitize", skip_all, fields(file = ?args.file))]
pub fn cmd_sanitize(
    args: SanitizeArgs,
    global_json: bool,
    max_input: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = ?args.file, "executing sanitize command");

    let content = super::read_input(args.file.as_deref(), max_input)?;
    let text = sanitize(&content);
    debug!(input_len = content.len(), output_len = text.len(), "sanitized");

    if global_json {
        let report = SanitizeReport {
            changed: text != content,
            length: text.chars().count(),
            text,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{text}");
    }

    Ok(())
}
