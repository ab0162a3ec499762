//! String Pipeline Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. These only arise while *building* a pipeline; a built
//! pipeline never fails on its input.

use derive_more::{Display, Error};

/// A string pipeline error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for string pipeline construction.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The regular expression does not compile.
    #[display("invalid regular expression: {_0}")]
    InvalidRegex(#[error(not(source))] String),
    /// Splitting on an empty separator would split between every character.
    #[display("split separator cannot be empty")]
    EmptySeparator,
    /// Minimum length is greater than maximum length.
    #[display("invalid length bounds: minimum {min} exceeds maximum {max}")]
    InvalidBounds {
        /// Requested minimum number of characters.
        min: usize,
        /// Requested maximum number of characters.
        max: usize,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
