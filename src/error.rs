//! Façade Error Types
//!
//! Each variant names the collaborator that failed; the error tree below it
//! carries the underlying crate's own error.

use derive_more::{Display, Error};

/// A façade error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for façade operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Text shown to the reader for any failure.
pub const USER_MESSAGE: &str = "Something went wrong";

/// Classifies the origin of a façade failure.
///
/// A missing row is never an error: lookups return `None`.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A statement against the library database failed.
    #[display("library database error")]
    Database,
    /// A document storage operation failed.
    #[display("document storage error")]
    Storage,
    /// Reading or writing a persisted preference failed.
    #[display("preference store error")]
    Preferences,
    /// The configuration could not be loaded.
    #[display("configuration error")]
    Config,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database | Self::Storage | Self::Preferences)
    }

    /// The generic, user-facing description of this failure.
    pub fn user_message(&self) -> &'static str {
        USER_MESSAGE
    }
}
