//! Core types and traits for ondelete.
//!
//! This crate provides the building blocks the deletion preview is made of:
//!
//! - `Model` trait describing a persisted record and its identity
//! - `FieldInfo` / `ReferentialAction` column metadata for foreign keys
//! - `RelationshipDescriptor` and the `PolicyTag` classification
//! - `RelationshipSource` / `ReferenceQuery`, the two capabilities a store supplies
//! - `SchemaRegistry`, a static `RelationshipSource` built from model metadata
//! - `Value` / `Row` for type-erased referencing records

pub mod error;
pub mod field;
pub mod identifiers;
pub mod model;
pub mod registry;
pub mod relationship;
pub mod row;
pub mod store;
pub mod value;

pub use error::{Error, InvalidPageError, InvalidPageKind, Result, UnpersistedRecordError};
pub use field::{FieldInfo, ReferentialAction};
pub use identifiers::quote_ident;
pub use model::Model;
pub use registry::SchemaRegistry;
pub use relationship::{PolicyTag, RelationshipDescriptor, RemovalBehavior, classify};
pub use row::{ColumnInfo, FromValue, Row};
pub use store::{ReferenceQuery, RelationshipSource};
pub use value::Value;
