//! TEXT timestamps as stored in the `created_at`/`updated_at` columns.
//!
//! New values are written as `YYYY-MM-DD HH:MM:SS.mmm` in UTC. That is the
//! shape of SQLite's `datetime('now')` column defaults plus milliseconds, so
//! both sort lexicographically. Rows written by earlier releases use an
//! unpadded month and day (`2023-7-4 09:05:00`) in device time; they are
//! still parsed, and are rewritten padded when the database is opened. Their
//! time of day is not shifted to UTC, so legacy rows can be off by the
//! device's UTC offset when ordered against new ones.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const STORED: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]");
// `padding:none` still accepts zero-padded input when parsing.
const LENIENT_FRACTIONAL: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month padding:none]-[day padding:none] [hour]:[minute]:[second].[subsecond]");
const LENIENT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month padding:none]-[day padding:none] [hour]:[minute]:[second]");

/// The current instant in UTC, without an offset (as stored).
pub fn now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format(timestamp: PrimitiveDateTime) -> Result<String> {
    timestamp.format(STORED).or_raise(|| ErrorKind::InvalidData("timestamp"))
}

pub(crate) fn parse(value: &str) -> Result<PrimitiveDateTime> {
    let value = value.trim();
    PrimitiveDateTime::parse(value, LENIENT_FRACTIONAL)
        .or_else(|_| PrimitiveDateTime::parse(value, LENIENT))
        .or_raise(|| ErrorKind::InvalidData("timestamp"))
}

pub(crate) fn parse_optional(value: Option<String>) -> Result<Option<PrimitiveDateTime>> {
    value.filter(|v| !v.trim().is_empty()).map(|v| parse(&v)).transpose()
}
