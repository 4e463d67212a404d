//! Sorting and limiting of listing queries.
//!
//! `ORDER BY` cannot be bound as a statement parameter, so the column and the
//! direction are interpolated into the SQL text. Both come from the closed
//! enumerations below and are rendered from `&'static str` only: a caller can
//! pick *which* known column to sort by, but can never supply SQL.

use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Table whose column an ambiguous sort key (`created_at`, `updated_at`)
/// refers to. Each listing query decides this, not the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortTable {
    Files,
    Metadata,
}

/// Columns a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Id,
    Name,
    Size,
    CreatedAt,
    UpdatedAt,
    CurrentPage,
    TotalPages,
    FirstPublishYear,
}

impl SortColumn {
    /// The fully qualified column, as it appears in the joined queries
    /// (`files f INNER JOIN metadata m`).
    pub(crate) fn qualified(self, table: SortTable) -> &'static str {
        match (self, table) {
            (Self::Id, _) => "f.id",
            (Self::Name, _) => "f.name",
            (Self::Size, _) => "f.size",
            (Self::CreatedAt, SortTable::Files) => "f.created_at",
            (Self::CreatedAt, SortTable::Metadata) => "m.created_at",
            (Self::UpdatedAt, SortTable::Files) => "f.updated_at",
            (Self::UpdatedAt, SortTable::Metadata) => "m.updated_at",
            (Self::CurrentPage, _) => "m.current_page",
            (Self::TotalPages, _) => "m.total_pages",
            (Self::FirstPublishYear, _) => "m.first_publish_year",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Size => "size",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::CurrentPage => "current_page",
            Self::TotalPages => "total_pages",
            Self::FirstPublishYear => "first_publish_year",
        }
    }
}

impl FromStr for SortColumn {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Id,
            Self::Name,
            Self::Size,
            Self::CreatedAt,
            Self::UpdatedAt,
            Self::CurrentPage,
            Self::TotalPages,
            Self::FirstPublishYear,
        ]
        .into_iter()
        .find(|column| column.as_str() == s)
        .ok_or_else(|| exn::Exn::from(ErrorKind::InvalidParameter(format!("unknown sort column `{s}`"))))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => exn::bail!(ErrorKind::InvalidParameter(format!("unknown sort order `{s}`"))),
        }
    }
}

/// Limit and ordering applied to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    pub limit: u32,
    pub sort_by: SortColumn,
    pub sort_order: SortOrder,
}

impl QueryFilter {
    /// Default for the full library listing: newest imports first.
    pub const ALL: Self = Self::new(25, SortColumn::CreatedAt, SortOrder::Desc);
    /// Default for the starred and continue-reading shelves: most recently
    /// touched first.
    pub const ACTIVITY: Self = Self::new(25, SortColumn::UpdatedAt, SortOrder::Desc);
    /// Default for search results: oldest imports first.
    pub const SEARCH: Self = Self::new(100, SortColumn::CreatedAt, SortOrder::Asc);

    pub const fn new(limit: u32, sort_by: SortColumn, sort_order: SortOrder) -> Self {
        Self { limit, sort_by, sort_order }
    }

    pub const fn with_limit(self, limit: u32) -> Self {
        Self { limit, ..self }
    }

    /// Render the `ORDER BY ... LIMIT ?` tail of a listing query.
    pub(crate) fn order_clause(&self, table: SortTable) -> String {
        // Tie-break on the primary key so equal timestamps keep a stable order.
        format!(
            "ORDER BY {} {}, f.id {} LIMIT ?",
            self.sort_by.qualified(table),
            self.sort_order.as_sql(),
            self.sort_order.as_sql()
        )
    }
}
