//! Contracts the host application provides to the media importers.

use crate::ServiceKey;
use std::collections::BTreeSet;

/// An already-loaded file record.
pub trait MediaRecord {
    /// Current storage tags the record has on `service`.
    ///
    /// The set's order (lexicographic) is the order importers return tags in.
    fn current_tags(&self, service: &ServiceKey) -> BTreeSet<String>;

    /// Every known URL for the record, in the host's order.
    fn urls(&self) -> Vec<String>;
}

/// Resolves service keys to the names users know them by.
pub trait ServiceRegistry {
    /// `None` when the key is unknown to the host.
    fn name(&self, service: &ServiceKey) -> Option<String>;
}
