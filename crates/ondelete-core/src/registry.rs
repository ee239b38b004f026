//! Static relationship source built from model metadata.
//!
//! Models declare their foreign keys through `FieldInfo`. Registering them
//! here lets the inspector discover reverse relationships without asking the
//! database, which is useful when the schema is owned by the application.

use crate::Result;
use crate::error::{Error, SchemaError, SchemaErrorKind};
use crate::field::{FieldInfo, ReferentialAction};
use crate::model::Model;
use crate::relationship::RelationshipDescriptor;
use crate::store::RelationshipSource;

#[derive(Debug, Clone)]
struct RegisteredTable {
    table: &'static str,
    fields: &'static [FieldInfo],
}

/// Registry of models whose foreign keys are scanned for reverse relationships.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    tables: Vec<RegisteredTable>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model (builder style).
    pub fn register<M: Model>(mut self) -> Self {
        self.add::<M>();
        self
    }

    /// Register a model. Registering the same table twice is a no-op.
    pub fn add<M: Model>(&mut self) {
        if self.contains(M::TABLE_NAME) {
            return;
        }
        self.tables.push(RegisteredTable {
            table: M::TABLE_NAME,
            fields: M::fields(),
        });
    }

    /// Whether a table is registered.
    pub fn contains(&self, table: &str) -> bool {
        self.tables
            .iter()
            .any(|t| t.table.eq_ignore_ascii_case(table))
    }

    /// Registered table names, in registration order.
    pub fn table_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tables.iter().map(|t| t.table)
    }
}

impl RelationshipSource for SchemaRegistry {
    fn reverse_relationships(&self, table: &str) -> Result<Vec<RelationshipDescriptor>> {
        let mut found = Vec::new();
        for registered in &self.tables {
            for field in registered.fields {
                let Some(reference) = field.foreign_key else {
                    continue;
                };
                let Some((target_table, target_column)) = field.foreign_key_target() else {
                    return Err(Error::Schema(SchemaError {
                        kind: SchemaErrorKind::Invalid,
                        message: format!(
                            "foreign key '{}' on {}.{} is not of the form table.column",
                            reference, registered.table, field.column_name
                        ),
                    }));
                };
                if !target_table.eq_ignore_ascii_case(table) {
                    continue;
                }
                found.push(
                    RelationshipDescriptor::new(
                        registered.table,
                        field.column_name,
                        target_table,
                        field.on_delete.unwrap_or(ReferentialAction::NoAction),
                    )
                    .target_column(target_column),
                );
            }
        }
        tracing::trace!(table, count = found.len(), "Registry reverse relationships");
        Ok(found)
    }
}
