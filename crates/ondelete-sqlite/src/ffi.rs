//! Low-level libsqlite3 surface used by the driver.
//!
//! The raw bindings come from `libsqlite3-sys`; this module narrows them to
//! what the driver calls and adds a few safe helpers.

pub use libsqlite3_sys::{
    SQLITE_AUTH, SQLITE_BLOB, SQLITE_BUSY, SQLITE_CONSTRAINT, SQLITE_DONE, SQLITE_FLOAT,
    SQLITE_INTEGER, SQLITE_INTERRUPT, SQLITE_LOCKED, SQLITE_NOTFOUND, SQLITE_NULL, SQLITE_OK,
    SQLITE_OPEN_CREATE, SQLITE_OPEN_READONLY, SQLITE_OPEN_READWRITE, SQLITE_PERM, SQLITE_ROW,
    SQLITE_TEXT, SQLITE_TOOBIG, sqlite3, sqlite3_bind_blob, sqlite3_bind_double,
    sqlite3_bind_int, sqlite3_bind_int64, sqlite3_bind_null, sqlite3_bind_text,
    sqlite3_busy_timeout, sqlite3_changes, sqlite3_close, sqlite3_column_blob,
    sqlite3_column_bytes, sqlite3_column_count, sqlite3_column_double, sqlite3_column_int64,
    sqlite3_column_name, sqlite3_column_text, sqlite3_column_type, sqlite3_destructor_type,
    sqlite3_errcode, sqlite3_errmsg, sqlite3_exec, sqlite3_finalize, sqlite3_free,
    sqlite3_get_autocommit, sqlite3_last_insert_rowid, sqlite3_open_v2, sqlite3_prepare_v2,
    sqlite3_step, sqlite3_stmt,
};

use std::ffi::{CStr, c_int};

/// Destructor telling SQLite to copy bound text/blob data immediately.
pub fn transient() -> sqlite3_destructor_type {
    libsqlite3_sys::SQLITE_TRANSIENT()
}

/// Get the SQLite library version as a string.
pub fn version() -> &'static str {
    // SAFETY: sqlite3_libversion returns a static string
    unsafe {
        let ptr = libsqlite3_sys::sqlite3_libversion();
        CStr::from_ptr(ptr).to_str().unwrap_or("unknown")
    }
}

/// Convert an SQLite result code to a human-readable string.
pub fn error_string(code: c_int) -> &'static str {
    // SAFETY: sqlite3_errstr returns a static string
    unsafe {
        let ptr = libsqlite3_sys::sqlite3_errstr(code);
        CStr::from_ptr(ptr).to_str().unwrap_or("unknown error")
    }
}

/// Last error message recorded on a connection.
///
/// # Safety
/// `db` must be a valid, open connection handle.
pub unsafe fn last_error(db: *mut sqlite3) -> (c_int, String) {
    // SAFETY: caller guarantees db is valid; errmsg is owned by SQLite
    unsafe {
        let msg = CStr::from_ptr(sqlite3_errmsg(db))
            .to_string_lossy()
            .into_owned();
        (sqlite3_errcode(db), msg)
    }
}
