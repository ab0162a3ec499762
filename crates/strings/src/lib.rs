//! String transformation pipelines.
//!
//! The building blocks are small and composable:
//!
//! - [`StringConverter`] maps one string to one string through an ordered
//!   list of [`Conversion`]s,
//! - [`StringMatch`] decides whether a string is kept,
//! - [`StringSplitter`] turns one string into many,
//! - [`StringProcessor`] chains any of the above over a whole list.
//!
//! Every type is [`Serialisable`](tagport_serialise::Serialisable), and all of
//! them are infallible once built: invalid regular expressions and bounds are
//! rejected at construction (or load) time, never while processing.

mod converter;
pub mod error;
mod matcher;
mod pattern;
mod processor;
mod splitter;

pub use crate::converter::{Conversion, StringConverter};
pub use crate::matcher::{MatchKind, StringMatch};
pub use crate::pattern::Pattern;
pub use crate::processor::{ProcessingStep, StringProcessor};
pub use crate::splitter::StringSplitter;
