//! In-memory media records and service registries for testing.

use crate::{MediaRecord, ServiceKey, ServiceRegistry};
use std::collections::{BTreeSet, HashMap};

/// An in-memory [`MediaRecord`].
///
/// ```
/// use tagport_import::mock::MockMedia;
/// use tagport_import::{MediaRecord, ServiceKey};
///
/// let media = MockMedia::new().with_tags(ServiceKey::combined_tags(), ["skirt", "blue eyes"]);
/// let tags = media.current_tags(&ServiceKey::combined_tags());
/// assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["blue eyes", "skirt"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockMedia {
    tags: HashMap<ServiceKey, BTreeSet<String>>,
    urls: Vec<String>,
}
impl MockMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds tags on `service`, on top of any it already has.
    pub fn with_tags<S: Into<String>>(mut self, service: ServiceKey, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags.entry(service).or_default().extend(tags.into_iter().map(Into::<String>::into));
        self
    }

    pub fn with_urls<S: Into<String>>(mut self, urls: impl IntoIterator<Item = S>) -> Self {
        self.urls.extend(urls.into_iter().map(Into::<String>::into));
        self
    }
}
impl MediaRecord for MockMedia {
    fn current_tags(&self, service: &ServiceKey) -> BTreeSet<String> {
        self.tags.get(service).cloned().unwrap_or_default()
    }

    fn urls(&self) -> Vec<String> {
        self.urls.clone()
    }
}

/// An in-memory [`ServiceRegistry`]. Knows no services until told.
#[derive(Debug, Clone, Default)]
pub struct MockServices {
    names: HashMap<ServiceKey, String>,
}
impl MockServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, service: ServiceKey, name: impl Into<String>) -> Self {
        self.names.insert(service, name.into());
        self
    }
}
impl ServiceRegistry for MockServices {
    fn name(&self, service: &ServiceKey) -> Option<String> {
        self.names.get(service).cloned()
    }
}
