use crate::error::{Error, ErrorKind};
use crate::record::{Chapter, Metadata};
use exn::ResultExt;

/// Serialized form of an empty table of contents.
pub(crate) const EMPTY_TABLE_OF_CONTENTS: &str = "[]";

#[derive(sqlx::FromRow)]
pub(crate) struct MetadataRow {
    pub(crate) image: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) table_of_contents: Option<String>,
    pub(crate) subjects: Option<String>,
    pub(crate) first_publish_year: Option<i64>,
    pub(crate) chapters: Option<i64>,
    pub(crate) current_page: i64,
    pub(crate) total_pages: i64,
}
impl TryFrom<&Metadata> for MetadataRow {
    type Error = Error;
    fn try_from(metadata: &Metadata) -> Result<Self, Self::Error> {
        Ok(Self {
            image: metadata.image.clone(),
            description: metadata.description.clone(),
            author: metadata.author.clone(),
            table_of_contents: Some(serialize_table_of_contents(&metadata.table_of_contents)?),
            subjects: metadata.subjects.clone(),
            first_publish_year: metadata.first_publish_year.map(i64::from),
            chapters: metadata.chapters.map(i64::from),
            current_page: i64::from(metadata.current_page),
            total_pages: i64::from(metadata.total_pages),
        })
    }
}
impl TryFrom<MetadataRow> for Metadata {
    type Error = Error;
    fn try_from(row: MetadataRow) -> Result<Self, Self::Error> {
        Ok(Self {
            image: row.image,
            description: row.description,
            author: row.author,
            table_of_contents: parse_table_of_contents(row.table_of_contents.as_deref())?,
            subjects: row.subjects,
            first_publish_year: row
                .first_publish_year
                .map(|y| i32::try_from(y).or_raise(|| ErrorKind::InvalidData("first publish year")))
                .transpose()?,
            chapters: row
                .chapters
                .map(|c| u32::try_from(c).or_raise(|| ErrorKind::InvalidData("chapters")))
                .transpose()?,
            current_page: u32::try_from(row.current_page).or_raise(|| ErrorKind::InvalidData("current page"))?,
            total_pages: u32::try_from(row.total_pages).or_raise(|| ErrorKind::InvalidData("total pages"))?,
        })
    }
}

pub(crate) fn parse_table_of_contents(raw: Option<&str>) -> Result<Vec<Chapter>, Error> {
    match raw.map(str::trim) {
        None | Some("") | Some(EMPTY_TABLE_OF_CONTENTS) => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json).or_raise(|| ErrorKind::InvalidData("table of contents")),
    }
}

fn serialize_table_of_contents(chapters: &[Chapter]) -> Result<String, Error> {
    if chapters.is_empty() {
        return Ok(EMPTY_TABLE_OF_CONTENTS.to_string());
    }
    serde_json::to_string(chapters).or_raise(|| ErrorKind::InvalidData("table of contents"))
}
