//! Error types for ondelete operations.

use std::fmt;

/// The primary error type for all ondelete operations.
#[derive(Debug)]
pub enum Error {
    /// Connection-related errors (open, lost handle)
    Connection(ConnectionError),
    /// Query execution errors raised by the store
    Query(QueryError),
    /// Type conversion errors
    Type(TypeError),
    /// Schema metadata errors
    Schema(SchemaError),
    /// Configuration errors
    Config(ConfigError),
    /// The target record has no stable identity yet
    Unpersisted(UnpersistedRecordError),
    /// A requested page is outside `[1, num_pages]`
    InvalidPage(InvalidPageError),
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Failed to establish connection
    Connect,
    /// Connection lost during operation
    Disconnected,
}

#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub sql: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Syntax error in SQL
    Syntax,
    /// Constraint violation (unique, foreign key, etc.)
    Constraint,
    /// Table or column not found
    NotFound,
    /// Permission denied
    Permission,
    /// Data too large for column
    DataTruncation,
    /// Database is busy or locked
    Busy,
    /// Interrupted
    Cancelled,
    /// Other database error
    Database,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// Column not found
    ColumnNotFound,
    /// Invalid schema definition
    Invalid,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
}

/// Raised when the inspected record has not been persisted.
///
/// Reverse lookups need the record's primary key, so a record that
/// `Model::is_new()` or whose key contains NULL cannot be inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpersistedRecordError {
    /// Table of the rejected record.
    pub table: &'static str,
}

/// Why a page number was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPageKind {
    /// The page number is below 1.
    LessThanOne,
    /// There are no entries, so no page exists.
    NoResults,
    /// The page number is past the last page.
    OutOfRange,
}

/// Raised by the paginator for a page number outside `[1, num_pages]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPageError {
    pub kind: InvalidPageKind,
    pub requested: usize,
    pub num_pages: usize,
}

impl Error {
    /// Was this raised because the target record lacks an identity?
    pub fn is_unpersisted(&self) -> bool {
        matches!(self, Error::Unpersisted(_))
    }

    /// Was this raised for an out-of-range page request?
    pub fn is_invalid_page(&self) -> bool {
        matches!(self, Error::InvalidPage(_))
    }

    /// Get the SQL that caused this error, if available
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sql.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(e) => write!(f, "Connection error: {}", e.message),
            Error::Query(e) => write!(f, "Query error: {}", e.message),
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "Type error in column '{}': expected {}, found {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
            Error::Schema(e) => write!(f, "Schema error: {}", e.message),
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Unpersisted(e) => write!(f, "{}", e),
            Error::InvalidPage(e) => write!(f, "Invalid page: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for UnpersistedRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record of '{}' has no primary key yet; save it before inspecting its references",
            self.table
        )
    }
}

impl std::error::Error for UnpersistedRecordError {}

impl fmt::Display for InvalidPageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            InvalidPageKind::LessThanOne => {
                write!(f, "page number {} is less than 1", self.requested)
            }
            InvalidPageKind::NoResults => {
                write!(f, "page {} requested but there are no results", self.requested)
            }
            InvalidPageKind::OutOfRange => write!(
                f,
                "page {} is past the last page ({})",
                self.requested, self.num_pages
            ),
        }
    }
}

impl std::error::Error for InvalidPageError {}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::Connection(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<UnpersistedRecordError> for Error {
    fn from(err: UnpersistedRecordError) -> Self {
        Error::Unpersisted(err)
    }
}

impl From<InvalidPageError> for Error {
    fn from(err: InvalidPageError) -> Self {
        Error::InvalidPage(err)
    }
}

/// Result type alias for ondelete operations.
pub type Result<T> = std::result::Result<T, Error>;
