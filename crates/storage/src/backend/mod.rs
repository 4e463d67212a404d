//! Storage backend trait and implementations.
//!
//! Library rows record where each document was imported to; a
//! [`StorageBackend`] owns those files and removes them when the library
//! forgets a document.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use crate::path::validate as validate_path;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;

/// Storage paths of every stored document, in no particular order.
pub type DocumentStream<'a> = Pin<Box<dyn Stream<Item = Result<PathBuf>> + Send + 'a>>;

const DELETE_CONCURRENCY: usize = 8;

/// Where imported documents are kept.
///
/// # Path Handling
/// Storage paths are relative to the backend's root and normalized by
/// [`validate_path`](crate::validate_path). Paths recorded in the library
/// (the `files.path` column) go through [`locate()`](Self::locate) first.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use reda_storage::{backend::StorageBackend, error::Result};
///
/// async fn forget(backend: &dyn StorageBackend, stored: &Path) -> Result<()> {
///     let path = backend.locate(stored)?;
///     match backend.delete(&path).await {
///         Err(e) if e.is_not_found() => Ok(()),
///         other => other,
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// Map a path as recorded in the library to a storage path.
    ///
    /// The default accepts relative paths only. Backends rooted in a real
    /// directory also accept absolute paths inside that directory.
    fn locate(&self, stored: &Path) -> Result<PathBuf> {
        validate_path(stored)
    }

    /// Walk every stored document.
    ///
    /// Errors for single entries are yielded without ending the walk.
    fn documents(&self) -> DocumentStream<'_>;

    /// Delete one document.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if it does not
    /// exist.
    async fn delete(&self, path: &Path) -> Result<()>;

    /// Delete every stored document, a few at a time.
    ///
    /// Returns the number of documents deleted. Deletions that already
    /// happened are not undone when a later one fails.
    async fn delete_all(&self) -> Result<u64> {
        let paths: Vec<PathBuf> = self.documents().try_collect().await?;
        let count = paths.len() as u64;
        futures::stream::iter(paths.into_iter().map(Ok))
            .try_for_each_concurrent(DELETE_CONCURRENCY, |path| async move { self.delete(&path).await })
            .await?;
        tracing::info!(backend = self.name(), documents = count, "deleted all stored documents");
        Ok(count)
    }
}
