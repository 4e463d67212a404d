mod file;
mod join;
mod metadata;

pub(crate) use self::file::{FileRow, InsertFileRow};
pub(crate) use self::join::{JoinRow, ProgressRow};
pub(crate) use self::metadata::MetadataRow;
