//! In-memory storage backend for tests.

use super::DocumentStream;
use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Remembers which documents are stored; contents are never needed.
///
/// # Examples
///
/// ```
/// use reda_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_documents(["books/dune.epub"]);
/// backend.delete(Path::new("books/dune.epub")).await?;
/// assert!(!backend.contains("books/dune.epub").await);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MockBackend {
    documents: RwLock<BTreeSet<PathBuf>>,
}

impl MockBackend {
    /// Panics on a path that fails validation, so broken test setup cannot
    /// produce a passing test.
    pub fn with_documents(paths: impl IntoIterator<Item = impl AsRef<Path>>) -> Self {
        let documents = paths
            .into_iter()
            .map(|path| match validate_path(path.as_ref()) {
                Ok(valid) => valid,
                Err(_) => panic!("MockBackend::with_documents: invalid path {}", path.as_ref().display()),
            })
            .collect();
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Whether a document is stored at `path`.
    pub async fn contains(&self, path: impl AsRef<Path>) -> bool {
        match validate_path(path.as_ref()) {
            Ok(path) => self.documents.read().await.contains(&path),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn documents(&self) -> DocumentStream<'_> {
        Box::pin(async_stream::stream! {
            // Snapshot first; the lock is never held across a yield.
            let snapshot: Vec<PathBuf> = self.documents.read().await.iter().cloned().collect();
            for path in snapshot {
                yield Ok(path);
            }
        })
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let path = validate_path(path)?;
        if !self.documents.write().await.remove(&path) {
            exn::bail!(ErrorKind::NotFound(path));
        }
        Ok(())
    }
}
