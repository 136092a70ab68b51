//! Escape-url command: escape a link target.

use clap::Args;
use tracing::{debug, instrument};

use tgmark_core::escape_url;

/// Arguments for the `escape-url` subcommand.
#[derive(Args, Debug)]
pub struct EscapeUrlArgs {
    /// The URL to escape.
    pub url: String,
}

/// Print `url` with `(`, `)` and `\` escaped.
#[instrument(name = "cmd_escape_url", skip_all)]
pub fn cmd_escape_url(args: EscapeUrlArgs, global_json: bool) -> anyhow::Result<()> {
    debug!(url = %args.url, "executing escape-url command");

    let escaped = escape_url(&args.url);
    if global_json {
        let report = serde_json::json!({ "url": args.url, "escaped": escaped });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{escaped}");
    }

    Ok(())
}
