//! Import Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. A missing sidecar is *not* an error: importers return
//! an empty list for it.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An import error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The sidecar exists but could not be read as UTF-8 text. The I/O error
    /// is attached as a child.
    #[display("could not import from {}", _0.display())]
    SidecarRead(#[error(not(source))] PathBuf),
    /// The sidecar was read but its contents could not be parsed.
    #[display("could not parse sidecar {}", _0.display())]
    SidecarParse(#[error(not(source))] PathBuf),
    /// The filename converter needs a UTF-8 file name and did not get one.
    #[display("file name is not valid UTF-8: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// A service key that is not hexadecimal.
    #[display("invalid service key: {_0}")]
    InvalidServiceKey(#[error(not(source))] String),
    /// A media importer was handed a file path, or a sidecar importer a media record.
    #[display("{importer} expects {expected}")]
    SourceMismatch {
        /// Which importer was called.
        importer: &'static str,
        /// The kind of source it needs.
        expected: &'static str,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Nothing here retries on its own; a failed read is the one case where
        // the caller trying again later could see a different result.
        matches!(self, Self::SidecarRead(_))
    }
}
