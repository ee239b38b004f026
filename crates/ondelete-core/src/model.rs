//! Model trait for records that can be inspected before deletion.
//!
//! The `Model` trait defines the contract for structs mapped to database
//! tables: where they live, which columns make up their key, and how their
//! current values look as a row.

use crate::field::FieldInfo;
use crate::value::Value;

/// Trait for types that can be mapped to database tables.
///
/// # Example
///
/// ```
/// use ondelete_core::{FieldInfo, Model, Value};
///
/// struct Team {
///     id: Option<i64>,
///     name: String,
/// }
///
/// impl Model for Team {
///     const TABLE_NAME: &'static str = "teams";
///     const PRIMARY_KEY: &'static [&'static str] = &["id"];
///
///     fn fields() -> &'static [FieldInfo] {
///         static FIELDS: &[FieldInfo] = &[
///             FieldInfo::new("id", "id").primary_key(true),
///             FieldInfo::new("name", "name"),
///         ];
///         FIELDS
///     }
///
///     fn to_row(&self) -> Vec<(&'static str, Value)> {
///         vec![("id", self.id.into()), ("name", self.name.as_str().into())]
///     }
///
///     fn primary_key_value(&self) -> Vec<Value> {
///         vec![self.id.into()]
///     }
///
///     fn is_new(&self) -> bool {
///         self.id.is_none()
///     }
/// }
///
/// let team = Team { id: Some(3), name: "Avengers".into() };
/// assert_eq!(team.identity(), Some(vec![Value::BigInt(3)]));
/// ```
pub trait Model: Sized {
    /// The name of the database table.
    const TABLE_NAME: &'static str;

    /// The primary key column name(s).
    const PRIMARY_KEY: &'static [&'static str];

    /// Get field metadata for all columns.
    fn fields() -> &'static [FieldInfo];

    /// Convert this model instance to a row of values.
    fn to_row(&self) -> Vec<(&'static str, Value)>;

    /// Get the value of the primary key field(s).
    fn primary_key_value(&self) -> Vec<Value>;

    /// Check if this is a new record (primary key is None/default).
    fn is_new(&self) -> bool;

    /// The store-assigned identity, or `None` while the record is unsaved.
    ///
    /// A record without key values, or with any NULL key value, has no
    /// identity either.
    fn identity(&self) -> Option<Vec<Value>> {
        if self.is_new() {
            return None;
        }
        let key = self.primary_key_value();
        if key.is_empty() || key.iter().any(Value::is_null) {
            return None;
        }
        Some(key)
    }
}
