//! SQLite store for ondelete.
//!
// FFI bindings require unsafe code - this is expected for database drivers
#![allow(unsafe_code)]
//!
//! `SqliteConnection` is a small synchronous driver over libsqlite3. It
//! implements both store capabilities the inspector needs:
//!
//! - `RelationshipSource`: reverse foreign keys, read from
//!   `PRAGMA foreign_key_list` for every user table
//! - `ReferenceQuery`: `SELECT * FROM <table> WHERE <column> = ?1`, optionally
//!   inside a deferred read transaction
//!
//! # Example
//!
//! ```rust,ignore
//! use ondelete_core::{RelationshipSource, ReferenceQuery, Value};
//! use ondelete_sqlite::SqliteConnection;
//!
//! let conn = SqliteConnection::open_memory()?;
//! conn.execute_raw(
//!     "CREATE TABLE teams (id INTEGER PRIMARY KEY);
//!      CREATE TABLE heroes (id INTEGER PRIMARY KEY,
//!                           team_id INTEGER REFERENCES teams(id) ON DELETE CASCADE);",
//! )?;
//! let rels = conn.reverse_relationships("teams")?;
//! let rows = conn.query_by_reference("heroes", "team_id", &Value::BigInt(1))?;
//! ```
//!
//! # Type Mapping
//!
//! | Value | SQLite Type |
//! |-------|-------------|
//! | `Bool` | INTEGER (0/1) |
//! | `Int`, `BigInt` | INTEGER |
//! | `Double` | REAL |
//! | `Text` | TEXT |
//! | `Bytes` | BLOB |
//! | `Json` | TEXT |
//!
//! # Thread Safety
//!
//! `SqliteConnection` is both `Send` and `Sync`, using internal mutex
//! synchronization to protect the underlying SQLite handle.

pub mod connection;
pub mod ffi;
pub mod introspect;
pub mod types;

pub use connection::{OpenFlags, SqliteConfig, SqliteConnection};

/// Re-export the SQLite library version.
pub fn sqlite_version() -> &'static str {
    ffi::version()
}
