//! Serialisation Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Failures inside a nested blob (a string processor inside
//! an importer, say) surface as children of the outer blob's error.

use crate::TypeTag;
use derive_more::{Display, Error};

/// A serialisation error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for serialisation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The blob names a type code this build has never heard of.
    #[display("unknown serialisable type: {_0}")]
    UnknownType(#[error(not(source))] u16),
    /// The type is known but nothing registered a loader for it.
    #[display("no loader registered for {_0}")]
    Unregistered(#[error(not(source))] TypeTag),
    /// The blob is a valid blob, just not of the type that was asked for.
    #[display("expected {expected} blob, found {found}")]
    TypeMismatch {
        /// The type the caller asked to load.
        expected: TypeTag,
        /// The type the blob declares.
        found: TypeTag,
    },
    /// No migration step exists for the declared version. The blob is either
    /// from a newer build or corrupt; quarantine it rather than retry.
    #[display("{tag} cannot be upgraded from version {version}")]
    UnsupportedVersion {
        /// Type of the blob being upgraded.
        tag: TypeTag,
        /// Version the blob declared (or had reached when the chain broke).
        version: u32,
    },
    /// The payload does not have the positional shape its version promises.
    #[display("malformed {tag} payload for version {version}")]
    MalformedPayload {
        /// Type of the blob being read.
        tag: TypeTag,
        /// Version whose shape was expected.
        version: u32,
    },
    /// A migration table has gaps, duplicates, or overshoots its type's version.
    #[display("invalid migration table for {tag}: {reason}")]
    InvalidMigrations {
        /// Type owning the table.
        tag: TypeTag,
        /// What is wrong with it.
        reason: String,
    },
    /// Two loaders were registered for the same type.
    #[display("{_0} is already registered")]
    DuplicateType(#[error(not(source))] TypeTag),
    /// The outer `[tag, version, payload]` envelope could not be read.
    #[display("invalid blob envelope")]
    Envelope,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Blobs are pure data, loading the same one twice gives the same answer.
        false
    }
}
