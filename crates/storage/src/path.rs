//! Storage path normalization.
//!
//! A storage path names a document relative to the documents directory and
//! must never leave it.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path, PathBuf};

/// Normalize a storage path, rejecting any that escape the root.
///
/// Root components and `.` are dropped; `..` removes the previous component.
/// A path that climbs above the root, resolves to nothing, carries a Windows
/// prefix or contains a null byte is an
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use reda_storage::validate_path;
///
/// assert_eq!(validate_path("books/./old/../dune.epub/").unwrap(), Path::new("books/dune.epub"));
/// assert!(validate_path("../etc/passwd").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let invalid = || exn::Exn::from(ErrorKind::InvalidPath(path.to_path_buf()));
    let normalized = path.components().try_fold(PathBuf::new(), |mut acc, component| {
        match component {
            // Null bytes truncate the path once it reaches a syscall.
            Component::Normal(part) if part.as_encoded_bytes().contains(&0) => return Err(invalid()),
            Component::Normal(part) => acc.push(part),
            Component::ParentDir => {
                if !acc.pop() {
                    return Err(invalid());
                }
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => return Err(invalid()),
        }
        Ok(acc)
    })?;
    if normalized.as_os_str().is_empty() {
        return Err(invalid());
    }
    Ok(normalized)
}
