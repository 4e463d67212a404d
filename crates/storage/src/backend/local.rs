//! The documents directory on the device.

use crate::backend::DocumentStream;
use crate::error::{ErrorKind, Result};
use crate::{StorageBackend, path::validate as validate_path};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Documents kept in a directory on the local filesystem.
///
/// # Examples
///
/// ```no_run
/// use reda_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("documents", "/data/reda/documents")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}

impl LocalBackend {
    /// Use `root` as the documents directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if `root` is relative
    /// or names something other than a directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() || (root.exists() && !root.is_dir()) {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        // Runs once at startup; not worth making the constructor async.
        std::fs::create_dir_all(&root).map_err(|e| ErrorKind::from_io(e, &root))?;
        Ok(Self { name: name.into(), root })
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        Ok(self.root.join(validate_path(path)?))
    }

    fn storage_path(&self, absolute: &Path) -> Result<PathBuf> {
        let relative = absolute
            .strip_prefix(&self.root)
            .or_raise(|| ErrorKind::InvalidPath(absolute.to_path_buf()))?;
        validate_path(relative)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn locate(&self, stored: &Path) -> Result<PathBuf> {
        if stored.is_absolute() {
            self.storage_path(stored)
        } else {
            validate_path(stored)
        }
    }

    fn documents(&self) -> DocumentStream<'_> {
        Box::pin(stream! {
            let mut pending = vec![self.root.clone()];
            while let Some(dir) = pending.pop() {
                let mut entries = match fs::read_dir(&dir).await {
                    Ok(entries) => entries,
                    // Removed while walking.
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(e) => {
                        yield Err(exn::Exn::from(ErrorKind::from_io(e, &dir)));
                        continue;
                    },
                };
                loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break,
                        Err(e) => {
                            yield Err(exn::Exn::from(ErrorKind::from_io(e, &dir)));
                            break;
                        },
                    };
                    let path = entry.path();
                    match entry.file_type().await {
                        Ok(kind) if kind.is_dir() => pending.push(path),
                        Ok(kind) if kind.is_file() => {
                            yield self.storage_path(&path);
                        },
                        // Symlinks and other special files are not documents.
                        Ok(_) => {},
                        Err(e) => {
                            yield Err(exn::Exn::from(ErrorKind::from_io(e, &path)));
                        },
                    }
                }
            }
        })
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let absolute = self.absolute(path)?;
        fs::remove_file(&absolute).await.map_err(|e| ErrorKind::from_io(e, path))?;
        tracing::debug!(backend = %self.name, path = %path.display(), "deleted stored document");
        Ok(())
    }
}
