//! Render command: compose a length-bounded reply with a source footer.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use tracing::{debug, instrument};

use tgmark_core::{ReplyOptions, compose_reply};

/// Arguments for the `render` subcommand.
#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// File with the reply body (reads stdin when omitted or `-`).
    pub file: Option<Utf8PathBuf>,

    /// Source URL linked in the footer.
    #[arg(long, value_name = "URL")]
    pub source_url: Option<String>,

    /// Footer link text (default: `src`).
    #[arg(long)]
    pub label: Option<String>,

    /// Message limit in chars (default: 4000, at most 4096).
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Compose a reply from a file or stdin and print it.
#[instrument(name = "cmd_render", skip_all, fields(file = ?args.file))]
pub fn cmd_render(
    args: RenderArgs,
    global_json: bool,
    defaults: ReplyOptions,
    max_input: Option<usize>,
) -> anyhow::Result<()> {
    debug!(
        file = ?args.file,
        source_url = ?args.source_url,
        limit = ?args.limit,
        "executing render command"
    );

    let body = super::read_input(args.file.as_deref(), max_input)?;
    let options = ReplyOptions {
        limit: args.limit.unwrap_or(defaults.limit),
        label: args.label.unwrap_or(defaults.label),
    };
    let reply = compose_reply(&body, args.source_url.as_deref(), &options)
        .context("failed to compose reply")?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        println!("{}", reply.text);
    }

    Ok(())
}
