//! Library records handed to the presentation layer.
//!
//! These are the typed counterparts of the `files` and `metadata` rows. The
//! row structs in `models` mirror the SQL columns; everything here is what a
//! screen actually consumes.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::PrimitiveDateTime;

/// Primary key of a `files` row (and `metadata.file_id`).
#[derive(Debug, Display, From, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(i64);

impl FileId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

/// A document known to the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    pub id: FileId,
    pub name: String,
    /// Where the document lives on device storage.
    pub path: PathBuf,
    pub size: u64,
    pub has_started: bool,
    pub has_finished: bool,
    pub is_downloaded: bool,
    pub is_starred: bool,
}

/// One entry of a document's table of contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chapter {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagenum: Option<String>,
}

/// Descriptive metadata and reading progress of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub image: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub table_of_contents: Vec<Chapter>,
    pub subjects: Option<String>,
    pub first_publish_year: Option<i32>,
    pub chapters: Option<u32>,
    pub current_page: u32,
    pub total_pages: u32,
}

/// A file joined with its metadata row.
///
/// Which timestamps are present depends on the query that produced it:
/// lookups and listings carry the metadata row's `created_at`/`updated_at`,
/// while search results carry the file row's `created_at` and no
/// `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedFile {
    pub file: File,
    pub metadata: Metadata,
    pub created_at: Option<PrimitiveDateTime>,
    pub updated_at: Option<PrimitiveDateTime>,
}

impl CombinedFile {
    pub fn id(&self) -> FileId {
        self.file.id
    }
}

/// Reading state of a document, as consulted before saving a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub has_started: bool,
    pub has_finished: bool,
    pub current_page: u32,
    pub total_pages: u32,
}

/// A document being added to the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub is_downloaded: bool,
}

impl NewFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size,
            is_downloaded: true,
        }
    }
}

/// Metadata stored alongside a [`NewFile`].
pub type NewMetadata = Metadata;
