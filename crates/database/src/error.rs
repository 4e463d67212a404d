//! Database Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction, the same shape every crate in this workspace uses.

use derive_more::{Display, Error};

/// A database error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// A row that does not exist is never an error: lookups return `None`.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A stored value could not be converted to (or from) its model type.
    #[display("invalid stored data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
    /// A caller-supplied value is not acceptable for a query.
    #[display("invalid query parameter: {_0}")]
    InvalidParameter(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// SQLite reports a busy database as a plain statement failure, so a
    /// failed statement is worth one more attempt from the user.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database)
    }
}
