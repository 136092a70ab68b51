//! Core library for tgmark.
//!
//! Turns arbitrary text into Telegram MarkdownV2 the Bot API accepts, crops
//! sanitized text to a message budget without breaking its markup, and
//! composes replies with a source link footer. All text functions are pure
//! and total.
//!
//! # Modules
//!
//! - [`sanitizer`] - Escaping with entity preservation
//! - [`crop`] - Length-bounded cropping
//! - [`reply`] - Body plus footer composition
//! - [`escape`] - Reserved chars, escape pairs and URL escaping
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```
//! use tgmark_core::{crop, sanitize};
//!
//! let text = sanitize("Price: 1.5$ (approx.)");
//! assert_eq!(text, "Price: 1\\.5$ \\(approx\\.\\)");
//!
//! let (short, changed) = crop(&text, 12);
//! assert!(changed);
//! assert_eq!(short, "Price:\\.\\.\\.");
//! ```
#![deny(unsafe_code)]

pub mod config;
pub mod crop;
pub mod error;
pub mod escape;
pub mod reply;
pub mod sanitizer;

pub use config::{Config, ConfigLoader, ConfigSources, DEFAULT_MAX_INPUT_BYTES, LogLevel};
pub use crop::{Cropped, crop, crop_report, sanitize_and_crop};
pub use error::{ConfigError, ConfigResult, RenderError, RenderResult};
pub use escape::escape_url;
pub use reply::{Reply, ReplyOptions, compose_reply};
pub use sanitizer::{Sanitizer, TgMarkdownV2Sanitizer, sanitize};
