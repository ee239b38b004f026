//! Store capabilities backed by SQLite's own schema metadata.
//!
//! Reverse relationships come from `PRAGMA foreign_key_list`, run against
//! every user table, so nothing beyond the database file is needed.

#![allow(clippy::result_large_err)]

use crate::connection::SqliteConnection;
use ondelete_core::{
    ReferenceQuery, ReferentialAction, RelationshipDescriptor, RelationshipSource, Result, Row,
    Value, quote_ident,
};

const USER_TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
     ORDER BY name";

/// One row group of `PRAGMA foreign_key_list`, i.e. one constraint.
#[derive(Debug)]
struct ForeignKeyRows {
    id: i64,
    table: String,
    columns: Vec<(String, Option<String>)>,
    on_delete: String,
}

impl SqliteConnection {
    /// Names of all user tables, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        self.query(USER_TABLES_SQL, &[])?
            .iter()
            .map(|row| row.get_named::<String>("name"))
            .collect()
    }

    /// Foreign keys declared on `table`, in declaration order.
    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyRows>> {
        let sql = format!("PRAGMA foreign_key_list({})", quote_ident(table));
        let rows = self.query(&sql, &[])?;

        let mut keys: Vec<ForeignKeyRows> = Vec::new();
        for row in &rows {
            let id = row.get_named::<i64>("id")?;
            let referenced = row.get_named::<String>("table")?;
            let from = row.get_named::<String>("from")?;
            let to = row
                .get_named::<Option<String>>("to")?
                .filter(|to| !to.is_empty());
            let on_delete = row
                .get_named::<Option<String>>("on_delete")?
                .unwrap_or_default();

            match keys.iter_mut().find(|k| k.id == id) {
                Some(key) => key.columns.push((from, to)),
                None => keys.push(ForeignKeyRows {
                    id,
                    table: referenced,
                    columns: vec![(from, to)],
                    on_delete,
                }),
            }
        }

        // SQLite numbers keys newest first
        keys.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(keys)
    }
}

impl RelationshipSource for SqliteConnection {
    #[tracing::instrument(level = "debug", skip(self))]
    fn reverse_relationships(&self, table: &str) -> Result<Vec<RelationshipDescriptor>> {
        let mut descriptors = Vec::new();

        for referencing in self.table_names()? {
            for key in self.foreign_keys(&referencing)? {
                if !key.table.eq_ignore_ascii_case(table) {
                    continue;
                }
                let [(from, to)] = key.columns.as_slice() else {
                    tracing::debug!(
                        table = %referencing,
                        columns = key.columns.len(),
                        "Skipping composite foreign key"
                    );
                    continue;
                };

                let on_delete =
                    ReferentialAction::from_str(&key.on_delete).unwrap_or_else(|| {
                        tracing::debug!(
                            action = %key.on_delete,
                            "Unrecognised ON DELETE action, treating as NO ACTION"
                        );
                        ReferentialAction::NoAction
                    });

                let mut descriptor =
                    RelationshipDescriptor::new(&referencing, from, &key.table, on_delete);
                descriptor.target_column.clone_from(to);
                descriptors.push(descriptor);
            }
        }

        tracing::debug!(count = descriptors.len(), "Found reverse relationships");
        Ok(descriptors)
    }
}

impl ReferenceQuery for SqliteConnection {
    fn query_by_reference(&self, table: &str, column: &str, value: &Value) -> Result<Vec<Row>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?1",
            quote_ident(table),
            quote_ident(column)
        );
        self.query(&sql, std::slice::from_ref(value))
    }

    fn begin_read_snapshot(&self) -> Result<bool> {
        // An open transaction already pins the snapshot
        if self.in_transaction()? {
            return Ok(false);
        }
        self.begin()?;
        Ok(true)
    }

    fn end_read_snapshot(&self) -> Result<()> {
        self.commit()
    }
}
