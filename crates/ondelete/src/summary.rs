//! Confirmation-prompt counts derived from a mapping.

use crate::mapping::CollectedMapping;
use ondelete_core::PolicyTag;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How many records a deletion would remove or modify.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactSummary {
    /// Records in `delete` buckets.
    pub deleted: usize,
    /// Records in `set_null` buckets.
    pub modified: usize,
    /// Affected tables.
    pub tables: usize,
}

impl ImpactSummary {
    pub fn from_mapping(mapping: &CollectedMapping) -> Self {
        Self {
            deleted: mapping.count_tagged(PolicyTag::Delete),
            modified: mapping.count_tagged(PolicyTag::SetNull),
            tables: mapping.len(),
        }
    }

    /// True when the deletion touches nothing else.
    pub fn is_empty(&self) -> bool {
        self.deleted == 0 && self.modified == 0
    }
}

impl From<&CollectedMapping> for ImpactSummary {
    fn from(mapping: &CollectedMapping) -> Self {
        Self::from_mapping(mapping)
    }
}

impl fmt::Display for ImpactSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} objects will be deleted, {} objects will be modified",
            self.deleted, self.modified
        )
    }
}
