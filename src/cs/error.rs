//! Error type shared by every codec in the crate.

use thiserror::Error;

/// Errors returned by encode/decode operations.
///
/// Both kinds are terminal for the call that produced them: nothing is retried and no
/// partial output is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Input (or a codec parameter) is outside the domain the codec supports.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Encoded text does not match the codec's wire grammar.
    #[error("format error: {0}")]
    FormatError(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::FormatError(msg.into())
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
