//! Length-bounded replies with a source link footer.
//!
//! A reply is a sanitized body, cropped so that the body plus an optional
//! `[label](url)` footer fits in one Telegram message.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::crop::sanitize_and_crop;
use crate::error::{RenderError, RenderResult};
use crate::escape::{ELLIPSIS_LEN, escape_url};
use crate::sanitizer::sanitize;

/// Default message limit, leaving headroom under [`TELEGRAM_CHAR_LIMIT`].
pub const DEFAULT_CHAR_LIMIT: usize = 4000;

/// Hard upper bound Telegram puts on a text message.
pub const TELEGRAM_CHAR_LIMIT: usize = 4096;

/// Link text used for the footer when none is configured.
pub const DEFAULT_FOOTER_LABEL: &str = "src";

/// Settings for [`compose_reply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyOptions {
    /// Message limit in chars.
    pub limit: usize,
    /// Footer link text, sanitized before use.
    pub label: String,
}

impl Default for ReplyOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_CHAR_LIMIT,
            label: DEFAULT_FOOTER_LABEL.to_string(),
        }
    }
}

impl From<&Config> for ReplyOptions {
    fn from(config: &Config) -> Self {
        Self {
            limit: config.char_limit.unwrap_or(DEFAULT_CHAR_LIMIT),
            label: config
                .footer_label
                .clone()
                .unwrap_or_else(|| DEFAULT_FOOTER_LABEL.to_string()),
        }
    }
}

/// A composed message, ready to send with `parse_mode = MarkdownV2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Reply {
    /// Message text including the footer.
    pub text: String,
    /// Whether the body had to be cut.
    pub cropped: bool,
    /// Length of `text` in chars.
    pub length: usize,
    /// The limit the reply was composed for, after clamping.
    pub limit: usize,
}

/// Compose a reply from raw `body` text and an optional `source` URL.
///
/// The body is sanitized and, if needed, cropped and sanitized again until
/// it fits next to the footer.
///
/// ```
/// use tgmark_core::reply::{ReplyOptions, compose_reply};
///
/// let reply = compose_reply("1 + 1 = 2", Some("https://example.com"), &ReplyOptions::default())?;
/// assert_eq!(reply.text, "1 \\+ 1 \\= 2\n\n[src](https://example.com)");
/// # Ok::<(), tgmark_core::RenderError>(())
/// ```
#[tracing::instrument(skip_all, fields(body_len = body.len(), limit = options.limit))]
pub fn compose_reply(
    body: &str,
    source: Option<&str>,
    options: &ReplyOptions,
) -> RenderResult<Reply> {
    let limit = if options.limit > TELEGRAM_CHAR_LIMIT {
        tracing::warn!(
            requested = options.limit,
            max = TELEGRAM_CHAR_LIMIT,
            "limit exceeds what Telegram accepts, clamping"
        );
        TELEGRAM_CHAR_LIMIT
    } else {
        options.limit
    };

    let footer = source
        .map(|url| format!("\n\n[{}]({})", sanitize(&options.label), escape_url(url)))
        .unwrap_or_default();
    let footer_len = footer.chars().count();
    let budget = limit.saturating_sub(footer_len);
    if !footer.is_empty() && (footer_len > limit || budget < ELLIPSIS_LEN) {
        return Err(RenderError::FooterTooLong {
            footer: footer_len,
            limit,
        });
    }

    let body = sanitize_and_crop(body, budget);
    let cropped = body.changed;
    let mut text = body.text;
    text.push_str(&footer);
    let length = text.chars().count();
    tracing::debug!(length, cropped, "reply composed");
    Ok(Reply {
        text,
        cropped,
        length,
        limit,
    })
}
