//! Reverse relationship metadata and removal-policy classification.
//!
//! A `RelationshipDescriptor` describes one foreign key pointing *at* a
//! table, seen from the referenced side. Stores produce descriptors; the
//! inspector only looks at their `RemovalBehavior`, decided once here from
//! the raw `ReferentialAction`.

use crate::field::ReferentialAction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One reverse reference: `referencing_table.reference_column` points at
/// `target_table.target_column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDescriptor {
    /// Table holding the foreign key.
    pub referencing_table: String,
    /// Foreign key column on the referencing table.
    pub reference_column: String,
    /// Referenced table.
    pub target_table: String,
    /// Referenced column; `None` means the target's primary key.
    pub target_column: Option<String>,
    /// Declared ON DELETE action.
    pub on_delete: ReferentialAction,
}

impl RelationshipDescriptor {
    /// Create a descriptor referencing the target's primary key.
    pub fn new(
        referencing_table: impl Into<String>,
        reference_column: impl Into<String>,
        target_table: impl Into<String>,
        on_delete: ReferentialAction,
    ) -> Self {
        Self {
            referencing_table: referencing_table.into(),
            reference_column: reference_column.into(),
            target_table: target_table.into(),
            target_column: None,
            on_delete,
        }
    }

    /// Point the descriptor at a specific referenced column.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// The closed removal behavior of this relationship.
    pub fn removal_behavior(&self) -> RemovalBehavior {
        RemovalBehavior::from(self.on_delete)
    }
}

/// What removing the target does to rows referencing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalBehavior {
    /// Referencing rows are deleted with the target.
    CascadeDelete,
    /// The reference column is set to NULL.
    Nullify,
    /// Anything else (`NO ACTION`, `RESTRICT`, `SET DEFAULT`).
    Other,
}

impl From<ReferentialAction> for RemovalBehavior {
    fn from(action: ReferentialAction) -> Self {
        match action {
            ReferentialAction::Cascade => RemovalBehavior::CascadeDelete,
            ReferentialAction::SetNull => RemovalBehavior::Nullify,
            ReferentialAction::NoAction
            | ReferentialAction::Restrict
            | ReferentialAction::SetDefault => RemovalBehavior::Other,
        }
    }
}

/// Bucket a referencing record lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyTag {
    /// The record will be deleted.
    Delete,
    /// The record's reference will be set to NULL.
    SetNull,
}

impl PolicyTag {
    /// Wire name of the tag (`"delete"` / `"set_null"`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            PolicyTag::Delete => "delete",
            PolicyTag::SetNull => "set_null",
        }
    }
}

impl fmt::Display for PolicyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag a descriptor, or `None` when its policy is neither cascade nor set-null.
pub fn classify(descriptor: &RelationshipDescriptor) -> Option<PolicyTag> {
    match descriptor.removal_behavior() {
        RemovalBehavior::CascadeDelete => Some(PolicyTag::Delete),
        RemovalBehavior::Nullify => Some(PolicyTag::SetNull),
        RemovalBehavior::Other => None,
    }
}
