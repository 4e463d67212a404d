//! On-device storage for imported documents.
//!
//! Library rows only record where a document lives; the files themselves are
//! kept by a [`StorageBackend`]. The reader uses
//! [`LocalBackend`](backend::LocalBackend) rooted in its documents directory,
//! and tests use the in-memory `MockBackend` (feature `mock`).

pub mod backend;
pub mod error;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend>;
