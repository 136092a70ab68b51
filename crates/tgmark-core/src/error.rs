//! Error types for tgmark-core.

use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while composing a reply.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// The link footer alone does not fit in the message limit.
    #[error("footer needs {footer} chars but the limit is {limit}")]
    FooterTooLong {
        /// Length of the rendered footer in chars.
        footer: usize,
        /// The message limit in chars.
        limit: usize,
    },
}

/// Result type alias using [`RenderError`].
pub type RenderResult<T> = Result<T, RenderError>;
