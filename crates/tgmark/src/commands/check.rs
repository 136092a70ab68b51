//! Check command: gate on text already being valid, balanced MarkdownV2.

use anyhow::bail;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use tgmark_core::escape::{UnbalancedMarker, unbalanced_markers};
use tgmark_core::sanitize;

/// Arguments for the `check` subcommand.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// File to check (reads stdin when omitted or `-`).
    pub file: Option<Utf8PathBuf>,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    pass: bool,
    /// Sanitizing the text would not change it.
    sanitized: bool,
    /// Char offset of the first difference from the sanitized form.
    #[serde(skip_serializing_if = "Option::is_none")]
    first_difference: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unbalanced: Vec<UnbalancedMarker>,
}

impl CheckReport {
    fn new(text: &str) -> Self {
        let expected = sanitize(text);
        let first_difference = (text != expected).then(|| {
            text.chars()
                .zip(expected.chars())
                .take_while(|(a, b)| a == b)
                .count()
        });
        let unbalanced = unbalanced_markers(text);
        let sanitized = first_difference.is_none();
        Self {
            pass: sanitized && unbalanced.is_empty(),
            sanitized,
            first_difference,
            unbalanced,
        }
    }
}

/// Check a file or stdin and fail when it would not survive as-is.
#[instrument(name = "cmd_check", skip_all, fields(file = ?args.file))]
pub fn cmd_check(args: CheckArgs, global_json: bool, max_input: Option<usize>) -> anyhow::Result<()> {
    debug!(file = ?args.file, "executing check command");

    let content = super::read_input(args.file.as_deref(), max_input)?;
    let report = CheckReport::new(&content);
    let name = args
        .file
        .as_ref()
        .map_or_else(|| "stdin".to_string(), ToString::to_string);
    debug!(pass = report.pass, sanitized = report.sanitized, "checked");

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        if !report.pass {
            bail!("{name} is not valid MarkdownV2");
        }
        return Ok(());
    }

    if report.pass {
        println!("{} {name} is valid MarkdownV2", "PASS:".green());
        return Ok(());
    }

    if let Some(offset) = report.first_difference {
        println!(
            "{} {name} needs escaping at char {}",
            "FAIL:".red(),
            offset.yellow()
        );
    }
    for m in &report.unbalanced {
        println!(
            "{} {name} has {} unescaped `{}` (odd count)",
            "FAIL:".red(),
            m.count.yellow(),
            m.marker
        );
    }
    bail!("{name} is not valid MarkdownV2");
}
