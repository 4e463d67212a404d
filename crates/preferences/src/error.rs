//! Preference Store Error Types

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A preference store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for preference store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// A key that was never written is not an error: reads return `None`.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Reading or writing the backing file failed
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// The backing file exists but does not hold a JSON object
    #[display("corrupt preference file: {}", _0.display())]
    Corrupt(#[error(not(source))] PathBuf),
    /// A value could not be serialized
    #[display("preference serialization error")]
    Serialization,
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
