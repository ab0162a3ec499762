//! Configuration Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An explicitly requested configuration file does not exist.
    #[display("configuration file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The file extension does not name a supported format.
    #[display("unsupported configuration format: {}", _0.display())]
    UnsupportedFormat(#[error(not(source))] PathBuf),
    /// The layered sources could not be merged into a configuration.
    #[display("could not load configuration")]
    Load,
    /// A value parsed but does not make sense.
    #[display("invalid configuration value at {field}")]
    Invalid { field: String },
}

impl ErrorKind {
    pub(crate) fn invalid(field: impl Into<String>) -> Self {
        Self::Invalid { field: field.into() }
    }

    pub fn is_retryable(&self) -> bool {
        false
    }
}
