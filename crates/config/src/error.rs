//! Configuration Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration loading.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The platform reports no home directory to derive default locations from
    #[display("no home directory to derive default locations from")]
    NoHomeDirectory,
    /// A configuration source could not be read or has the wrong shape
    #[display("invalid configuration")]
    Invalid,
    /// A configured location must be an absolute path
    #[display("configured path is not absolute: {}", _0.display())]
    RelativePath(#[error(not(source))] PathBuf),
}
