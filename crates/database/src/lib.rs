//! SQLite store for the document library.
//!
//! Two tables make up the library: `files` holds one row per document on
//! device storage, and `metadata` holds exactly one row per file with its
//! descriptive data and reading progress. Every read joins the two; every
//! write that touches both runs in a single transaction.
//!
//! Databases created by earlier releases of the reader are adopted as they
//! are: the schema migration only creates what is missing, and timestamps in
//! the older unpadded format are still understood.

mod db;
pub mod error;
pub mod filter;
mod models;
pub mod record;
mod repo;
mod timestamp;

pub use crate::db::Database;
pub use crate::filter::{QueryFilter, SortColumn, SortOrder};
pub use crate::record::{Chapter, CombinedFile, File, FileId, Metadata, NewFile, NewMetadata, Progress};
pub use crate::repo::{Listing, PendingDelete, Repository};
pub use crate::timestamp::now;
