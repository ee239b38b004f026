//! ondelete - preview what deleting a record will do to the rows that
//! reference it.
//!
//! Given a persisted record, ondelete finds every row in other tables whose
//! foreign key points at it and sorts them by the key's ON DELETE action:
//!
//! - `delete`: the row is removed with the target (`ON DELETE CASCADE`)
//! - `set_null`: the row's reference is cleared (`ON DELETE SET NULL`)
//!
//! Other actions are ignored. Nothing is deleted; the result is advisory, for
//! confirmation screens of the form "3 objects will be deleted, 1 objects will
//! be modified".
//!
//! # Quick Start
//!
//! ```ignore
//! use ondelete::prelude::*;
//! use ondelete_sqlite::SqliteConnection;
//!
//! let conn = SqliteConnection::open_file("app.db")?;
//! let team = Team { id: Some(1), name: "Avengers".into() };
//!
//! let inspector = RelationInspector::new(&team, &conn)?;
//! println!("{}", inspector.summary());
//!
//! let view = inspector.paginator()?;
//! for page in view.pages() {
//!     for entry in page {
//!         for bucket in entry.buckets() {
//!             println!("{}: {} {}", entry.table(), bucket.len(), bucket.tag());
//!         }
//!     }
//! }
//! ```
//!
//! # Stores
//!
//! The inspector needs two capabilities, both defined in `ondelete-core`:
//! `RelationshipSource` (which foreign keys point at a table) and
//! `ReferenceQuery` (which rows hold a given key). `ondelete-sqlite`
//! implements both for a SQLite database; `SchemaRegistry` implements the
//! first from model metadata alone.

pub mod config;
pub mod inspector;
pub mod mapping;
pub mod paginate;
pub mod summary;

pub use config::InspectorConfig;
pub use inspector::RelationInspector;
pub use mapping::{AffectedTable, CollectedMapping, PolicyBucket};
pub use paginate::{DEFAULT_PAGE_SIZE, Page, PagedResultView};
pub use summary::ImpactSummary;

// Re-export core types so most users need only this crate
pub use ondelete_core::{
    Error, FieldInfo, InvalidPageError, InvalidPageKind, Model, PolicyTag, ReferenceQuery,
    ReferentialAction, RelationshipDescriptor, RelationshipSource, RemovalBehavior, Result, Row,
    SchemaRegistry, UnpersistedRecordError, Value, classify,
};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use ondelete::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AffectedTable, CollectedMapping, Error, FieldInfo, ImpactSummary, InspectorConfig, Model,
        Page, PagedResultView, PolicyTag, ReferenceQuery, ReferentialAction, RelationInspector,
        RelationshipDescriptor, RelationshipSource, Result, Row, SchemaRegistry, Value,
    };
}
