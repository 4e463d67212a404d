use crate::error::{Error, ErrorKind};
use crate::record::{File, FileId, NewFile};
use exn::{OptionExt, ResultExt};
use std::path::PathBuf;

#[derive(sqlx::FromRow)]
pub(crate) struct FileRow {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) size: i64,
    pub(crate) has_started: bool,
    pub(crate) has_finished: bool,
    pub(crate) is_downloaded: bool,
    pub(crate) is_starred: bool,
}
impl TryFrom<FileRow> for File {
    type Error = Error;
    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FileId::new(row.id),
            name: row.name,
            path: PathBuf::from(row.path),
            size: u64::try_from(row.size).or_raise(|| ErrorKind::InvalidData("file size"))?,
            has_started: row.has_started,
            has_finished: row.has_finished,
            is_downloaded: row.is_downloaded,
            is_starred: row.is_starred,
        })
    }
}

/// Column values of a `files` row about to be inserted (the id is assigned
/// by SQLite).
pub(crate) struct InsertFileRow {
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) size: i64,
    pub(crate) is_downloaded: bool,
}
impl TryFrom<&NewFile> for InsertFileRow {
    type Error = Error;
    fn try_from(file: &NewFile) -> Result<Self, Self::Error> {
        Ok(Self {
            name: file.name.clone(),
            path: file.path.to_str().ok_or_raise(|| ErrorKind::InvalidData("path"))?.to_string(),
            size: i64::try_from(file.size).or_raise(|| ErrorKind::InvalidData("file size"))?,
            is_downloaded: file.is_downloaded,
        })
    }
}
