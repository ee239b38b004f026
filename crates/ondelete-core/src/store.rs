//! Capabilities a store supplies to the inspector.
//!
//! The inspector never talks to a database directly. It needs exactly two
//! things: the reverse relationships declared against a table, and the rows
//! of a table whose reference column equals a value.

use crate::Result;
use crate::relationship::RelationshipDescriptor;
use crate::row::Row;
use crate::value::Value;

/// Schema introspection: which foreign keys point at a table.
pub trait RelationshipSource {
    /// List every relationship whose target is `table`, in declaration order.
    fn reverse_relationships(&self, table: &str) -> Result<Vec<RelationshipDescriptor>>;
}

/// The existence query run once per eligible relationship.
pub trait ReferenceQuery {
    /// Fetch rows of `table` whose `column` equals `value`, in store order.
    fn query_by_reference(&self, table: &str, column: &str, value: &Value) -> Result<Vec<Row>>;

    /// Start a read-consistent snapshot spanning several lookups.
    ///
    /// Returns `true` when a snapshot was opened and `end_read_snapshot`
    /// must be called. Stores without snapshot support keep the default.
    fn begin_read_snapshot(&self) -> Result<bool> {
        Ok(false)
    }

    /// Close a snapshot opened by `begin_read_snapshot`.
    fn end_read_snapshot(&self) -> Result<()> {
        Ok(())
    }
}

impl<T: RelationshipSource + ?Sized> RelationshipSource for &T {
    fn reverse_relationships(&self, table: &str) -> Result<Vec<RelationshipDescriptor>> {
        (**self).reverse_relationships(table)
    }
}

impl<T: ReferenceQuery + ?Sized> ReferenceQuery for &T {
    fn query_by_reference(&self, table: &str, column: &str, value: &Value) -> Result<Vec<Row>> {
        (**self).query_by_reference(table, column, value)
    }

    fn begin_read_snapshot(&self) -> Result<bool> {
        (**self).begin_read_snapshot()
    }

    fn end_read_snapshot(&self) -> Result<()> {
        (**self).end_read_snapshot()
    }
}
