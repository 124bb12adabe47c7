//! Error types shared by every codec in the crate.

use thiserror::Error;

/// Errors raised by the codecs.
///
/// Every error is local to the call that produced it: a codec never retries,
/// never returns partial output, and never substitutes a fallback value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// There is nothing to code.
    #[error("empty input: nothing to code")]
    EmptyInput,

    /// The bits or bytes are present but do not describe a decodable stream.
    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    /// A read ran past the declared end of the stream.
    #[error("truncated stream: needed {needed} more, only {available} available")]
    TruncatedStream { needed: usize, available: usize },

    /// An LZW code is neither a known dictionary entry nor the next assignable code.
    #[error("invalid code {code}: next assignable code is {next_code}")]
    InvalidCode { code: u32, next_code: u32 },

    /// A dictionary code no longer fits the fixed code width.
    #[error("code {code} exceeds the maximum representable code {max_code}")]
    UnsupportedAlphabetSize { code: u32, max_code: u32 },

    /// Caller-supplied parameters are malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Error::CorruptStream(msg.into())
    }

    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
