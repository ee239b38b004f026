//! Inspector configuration.

use crate::paginate::DEFAULT_PAGE_SIZE;

/// Options for a `RelationInspector` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectorConfig {
    /// Entries (affected tables) per page of the paginator.
    pub page_size: usize,
    /// Run all lookups inside one read snapshot of the store.
    pub consistent_read: bool,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            consistent_read: true,
        }
    }
}

impl InspectorConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size used by `RelationInspector::paginator`.
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Enable or disable the read snapshot around lookups.
    pub fn consistent_read(mut self, enabled: bool) -> Self {
        self.consistent_read = enabled;
        self
    }
}
