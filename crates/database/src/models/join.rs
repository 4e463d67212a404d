use crate::error::{Error, ErrorKind};
use crate::models::{FileRow, MetadataRow};
use crate::record::{CombinedFile, File, Metadata, Progress};
use crate::timestamp;
use exn::ResultExt;

/// Row of `files f INNER JOIN metadata m`.
///
/// The timestamp columns are selected from whichever table the query
/// projects them from, and may be missing from the projection entirely.
#[derive(sqlx::FromRow)]
pub(crate) struct JoinRow {
    #[sqlx(flatten)]
    pub(crate) file: FileRow,
    #[sqlx(flatten)]
    pub(crate) metadata: MetadataRow,
    #[sqlx(default)]
    pub(crate) created_at: Option<String>,
    #[sqlx(default)]
    pub(crate) updated_at: Option<String>,
}
impl TryFrom<JoinRow> for CombinedFile {
    type Error = Error;
    fn try_from(join: JoinRow) -> Result<Self, Self::Error> {
        Ok(Self {
            file: File::try_from(join.file)?,
            metadata: Metadata::try_from(join.metadata)?,
            created_at: timestamp::parse_optional(join.created_at)?,
            updated_at: timestamp::parse_optional(join.updated_at)?,
        })
    }
}

/// The progress-relevant subset of a joined row, read before deciding
/// whether a page update may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct ProgressRow {
    pub(crate) has_started: bool,
    pub(crate) has_finished: bool,
    pub(crate) current_page: i64,
    pub(crate) total_pages: i64,
}
impl TryFrom<ProgressRow> for Progress {
    type Error = Error;
    fn try_from(row: ProgressRow) -> Result<Self, Self::Error> {
        Ok(Self {
            has_started: row.has_started,
            has_finished: row.has_finished,
            current_page: u32::try_from(row.current_page).or_raise(|| ErrorKind::InvalidData("current page"))?,
            total_pages: u32::try_from(row.total_pages).or_raise(|| ErrorKind::InvalidData("total pages"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn join(created_at: Option<&str>, updated_at: Option<&str>) -> JoinRow {
        JoinRow {
            file: FileRow {
                id: 1,
                name: "Moby Dick".to_string(),
                path: "documents/moby-dick.pdf".to_string(),
                size: 100,
                has_started: false,
                has_finished: false,
                is_downloaded: true,
                is_starred: true,
            },
            metadata: MetadataRow {
                image: None,
                description: Some("Call me Ishmael.".to_string()),
                author: Some("Herman Melville".to_string()),
                table_of_contents: Some("[]".to_string()),
                subjects: None,
                first_publish_year: Some(1851),
                chapters: Some(135),
                current_page: 0,
                total_pages: 635,
            },
            created_at: created_at.map(str::to_string),
            updated_at: updated_at.map(str::to_string),
        }
    }

    #[test]
    fn test_join_to_model() {
        let model = CombinedFile::try_from(join(Some("2024-01-02 03:04:05"), Some("2024-1-3 10:00:00"))).unwrap();
        assert!(model.file.is_starred);
        assert_eq!(model.metadata.total_pages, 635);
        assert_eq!(model.created_at, Some(datetime!(2024-01-02 03:04:05)));
        assert_eq!(model.updated_at, Some(datetime!(2024-01-03 10:00:00)));
    }

    #[test]
    fn test_join_without_updated_at() {
        let model = CombinedFile::try_from(join(Some("2024-01-02 03:04:05"), None)).unwrap();
        assert_eq!(model.updated_at, None);
    }
}
