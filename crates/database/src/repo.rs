//! Repository for files and their metadata.
//!
//! The two tables are tightly coupled: every file has exactly one metadata
//! row, and every read joins them. Statements are stored as `.sql` files next
//! to the crate and always take user input as bound parameters; only the
//! `ORDER BY` tail of listings is rendered, from [`QueryFilter`].

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::filter::{QueryFilter, SortTable};
use crate::models::{InsertFileRow, JoinRow, MetadataRow, ProgressRow};
use crate::record::{CombinedFile, FileId, NewFile, NewMetadata, Progress};
use crate::timestamp;
use exn::ResultExt;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::instrument;

/// The shelves a listing can be drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listing {
    /// Every document in the library.
    All,
    /// Documents the reader starred.
    Starred,
    /// Documents the reader has started.
    ContinueReading,
}

impl Listing {
    fn query(self) -> &'static str {
        match self {
            Self::All => include_str!("../queries/list_all.sql"),
            Self::Starred => include_str!("../queries/list_starred.sql"),
            Self::ContinueReading => include_str!("../queries/list_continue_reading.sql"),
        }
    }

    // The library is ordered by the file rows, the shelves by the metadata
    // rows (whose `updated_at` moves on every star and page turn).
    fn sort_table(self) -> SortTable {
        match self {
            Self::All => SortTable::Files,
            Self::Starred | Self::ContinueReading => SortTable::Metadata,
        }
    }

    /// Filter applied when the caller does not supply one.
    pub fn default_filter(self) -> QueryFilter {
        match self {
            Self::All => QueryFilter::ALL,
            Self::Starred | Self::ContinueReading => QueryFilter::ACTIVITY,
        }
    }
}

/// Build a `LIKE` pattern matching `keyword` anywhere, with the wildcard
/// characters in `keyword` itself matched literally (`ESCAPE '\'`).
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn with_order(query: &str, filter: &QueryFilter, table: SortTable) -> String {
    format!("{}\n{}", query.trim_end(), filter.order_clause(table))
}

/// Repository for managing files and their metadata in the library database.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool.begin().await.or_raise(|| ErrorKind::Database)
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Insert a file and its metadata row in one transaction.
    #[instrument(skip(self, file, metadata), fields(name = %file.name))]
    pub async fn insert(&self, file: &NewFile, metadata: &NewMetadata) -> Result<FileId> {
        let file_row = InsertFileRow::try_from(file)?;
        let metadata_row = MetadataRow::try_from(metadata)?;
        let now = timestamp::format(timestamp::now())?;
        let mut tx = self.begin().await?;
        let id = sqlx::query(include_str!("../queries/insert_file.sql"))
            .bind(file_row.name)
            .bind(file_row.path)
            .bind(file_row.size)
            .bind(file_row.is_downloaded)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?
            .last_insert_rowid();
        sqlx::query(include_str!("../queries/insert_metadata.sql"))
            .bind(id)
            .bind(metadata_row.image)
            .bind(metadata_row.description)
            .bind(metadata_row.author)
            .bind(metadata_row.table_of_contents)
            .bind(metadata_row.subjects)
            .bind(metadata_row.first_publish_year)
            .bind(metadata_row.chapters)
            .bind(metadata_row.current_page)
            .bind(metadata_row.total_pages)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(FileId::new(id))
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    /// Total number of files in the library.
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_files.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("file count"))
    }

    /// Get a file and its metadata by id.
    ///
    /// A missing id is not an error: it returns `None`.
    pub async fn get_one(&self, id: FileId) -> Result<Option<CombinedFile>> {
        let row: Option<JoinRow> = sqlx::query_as(include_str!("../queries/get_by_id.sql"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(CombinedFile::try_from).transpose()
    }

    /// Get the reading state of a file, or `None` if it does not exist.
    pub async fn progress(&self, id: FileId) -> Result<Option<Progress>> {
        let row: Option<ProgressRow> = sqlx::query_as(include_str!("../queries/get_progress.sql"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Progress::try_from).transpose()
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// List the files of a shelf, ordered and limited by `filter`.
    pub async fn list(&self, listing: Listing, filter: &QueryFilter) -> Result<Vec<CombinedFile>> {
        let query = with_order(listing.query(), filter, listing.sort_table());
        let rows: Vec<JoinRow> = sqlx::query_as(&query)
            .bind(i64::from(filter.limit))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(CombinedFile::try_from).collect()
    }

    /// Files whose name contains `keyword`, ignoring ASCII case.
    ///
    /// Results carry the file's `created_at` and no `updated_at` (see
    /// [`CombinedFile`]). Any keyword is accepted, including very short ones.
    pub async fn search(&self, keyword: &str, filter: &QueryFilter) -> Result<Vec<CombinedFile>> {
        let query = with_order(include_str!("../queries/search.sql"), filter, SortTable::Files);
        let rows: Vec<JoinRow> = sqlx::query_as(&query)
            .bind(contains_pattern(keyword))
            .bind(i64::from(filter.limit))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(CombinedFile::try_from).collect()
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Flip the star flag of a file and stamp its metadata row.
    ///
    /// Both writes share one transaction. Returns `false` if the file does
    /// not exist (nothing is written).
    #[instrument(skip(self))]
    pub async fn toggle_star(&self, id: FileId) -> Result<bool> {
        let now = timestamp::format(timestamp::now())?;
        let mut tx = self.begin().await?;
        let flipped = sqlx::query(include_str!("../queries/toggle_star.sql"))
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?
            .rows_affected();
        if flipped == 0 {
            return Ok(false);
        }
        sqlx::query(include_str!("../queries/touch_metadata.sql"))
            .bind(now)
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(true)
    }

    /// Record the page count of a file.
    ///
    /// Only writes when the stored value differs; returns whether a row was
    /// changed (`false` for a missing file or an unchanged count).
    #[instrument(skip(self))]
    pub async fn update_total_pages(&self, id: FileId, total_pages: u32) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/update_total_pages.sql"))
            .bind(i64::from(total_pages))
            .bind(id.get())
            .bind(i64::from(total_pages))
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected() > 0)
    }

    /// Store the current page of a file and refresh its metadata timestamp,
    /// first marking the file as started when `mark_started` is set.
    ///
    /// Both writes share one transaction, so listings never see a page
    /// written without the started flag. Returns `false` if the file does not
    /// exist.
    #[instrument(skip(self))]
    pub async fn save_progress(&self, id: FileId, current_page: u32, mark_started: bool) -> Result<bool> {
        let now = timestamp::format(timestamp::now())?;
        let mut tx = self.begin().await?;
        if mark_started {
            sqlx::query(include_str!("../queries/mark_started.sql"))
                .bind(id.get())
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        let written = sqlx::query(include_str!("../queries/update_current_page.sql"))
            .bind(i64::from(current_page))
            .bind(now)
            .bind(id.get())
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?
            .rows_affected();
        if written == 0 {
            return Ok(false);
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(true)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete a file row and its metadata row, without committing.
    ///
    /// The returned [`PendingDelete`] holds the open write transaction: the
    /// caller removes whatever lives outside the database (the document
    /// itself) and then commits. Dropping it rolls the deletion back. Other
    /// writers wait on the busy timeout for as long as it is held.
    #[instrument(skip(self))]
    pub async fn begin_delete(&self, id: FileId) -> Result<PendingDelete> {
        let mut tx = self.begin().await?;
        for statement in [include_str!("../queries/delete_metadata.sql"), include_str!("../queries/delete_file.sql")] {
            sqlx::query(statement)
                .bind(id.get())
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        Ok(PendingDelete { tx })
    }

    /// Delete every file and metadata row in one transaction.
    ///
    /// Returns the number of files removed.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<u64> {
        let mut tx = self.begin().await?;
        sqlx::query(include_str!("../queries/clear_metadata.sql"))
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let files = sqlx::query(include_str!("../queries/clear_files.sql"))
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?
            .rows_affected();
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::info!(files, "cleared library database");
        Ok(files)
    }
}

/// An uncommitted deletion of one file's rows.
#[must_use = "dropping a pending delete rolls it back"]
pub struct PendingDelete {
    tx: Transaction<'static, Sqlite>,
}

impl PendingDelete {
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await.or_raise(|| ErrorKind::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{SortColumn, SortOrder};
    use crate::record::{Chapter, Metadata};
    use rstest::rstest;

    async fn repository() -> Repository {
        let db = Database::connect_in_memory().await.unwrap();
        Repository::from(&db)
    }

    async fn add(repo: &Repository, name: &str, current_page: u32, total_pages: u32) -> FileId {
        let file = NewFile::new(name, format!("documents/{name}.pdf"), 1024);
        let metadata = Metadata {
            current_page,
            total_pages,
            ..Metadata::default()
        };
        repo.insert(&file, &metadata).await.unwrap()
    }

    async fn stored_updated_at(repo: &Repository, id: FileId) -> String {
        sqlx::query_scalar("SELECT updated_at FROM metadata WHERE file_id = ?")
            .bind(id.get())
            .fetch_one(&repo.pool)
            .await
            .unwrap()
    }

    #[rstest]
    #[case("ab", "%ab%")]
    #[case("100%", "%100\\%%")]
    #[case("snake_case", "%snake\\_case%")]
    #[case("a\\b", "%a\\\\b%")]
    fn test_contains_pattern(#[case] keyword: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(keyword), expected);
    }

    #[tokio::test]
    async fn test_count_empty_library() {
        let repo = repository().await;
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_and_get_one() {
        let repo = repository().await;
        let file = NewFile::new("Dune", "documents/dune.epub", 4096);
        let metadata = Metadata {
            author: Some("Frank Herbert".to_string()),
            table_of_contents: vec![Chapter {
                title: "Book One: Dune".to_string(),
                ..Chapter::default()
            }],
            total_pages: 412,
            ..Metadata::default()
        };
        let id = repo.insert(&file, &metadata).await.unwrap();
        let found = repo.get_one(id).await.unwrap().unwrap();
        assert_eq!(found.file.name, "Dune");
        assert_eq!(found.metadata.author.as_deref(), Some("Frank Herbert"));
        assert_eq!(found.metadata.table_of_contents.len(), 1);
        assert!(found.created_at.is_some());
        assert!(found.updated_at.is_some());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_get_one_missing_is_none() {
        let repo = repository().await;
        assert!(repo.get_one(FileId::new(404)).await.unwrap().is_none());
        assert!(repo.progress(FileId::new(404)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all_is_limited_and_newest_first() {
        let repo = repository().await;
        for i in 0..30 {
            add(&repo, &format!("book-{i:02}"), 0, 10).await;
        }
        let files = repo.list(Listing::All, &Listing::All.default_filter()).await.unwrap();
        assert_eq!(files.len(), 25);
        assert_eq!(files[0].file.name, "book-29");
        assert_eq!(files[24].file.name, "book-05");
    }

    #[tokio::test]
    async fn test_list_with_custom_filter() {
        let repo = repository().await;
        add(&repo, "b", 0, 10).await;
        add(&repo, "c", 0, 10).await;
        add(&repo, "a", 0, 10).await;
        let filter = QueryFilter::new(2, SortColumn::Name, SortOrder::Asc);
        let names: Vec<_> =
            repo.list(Listing::All, &filter).await.unwrap().into_iter().map(|f| f.file.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_shelves_are_filtered() {
        let repo = repository().await;
        let starred = add(&repo, "starred", 0, 10).await;
        let reading = add(&repo, "reading", 0, 10).await;
        add(&repo, "untouched", 0, 10).await;
        assert!(repo.toggle_star(starred).await.unwrap());
        assert!(repo.save_progress(reading, 3, true).await.unwrap());

        let shelf = repo.list(Listing::Starred, &QueryFilter::ACTIVITY).await.unwrap();
        assert_eq!(shelf.iter().map(|f| f.id()).collect::<Vec<_>>(), vec![starred]);
        let shelf = repo.list(Listing::ContinueReading, &QueryFilter::ACTIVITY).await.unwrap();
        assert_eq!(shelf.iter().map(|f| f.id()).collect::<Vec<_>>(), vec![reading]);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_oldest_first() {
        let repo = repository().await;
        add(&repo, "Abbey Road Notes", 0, 10).await;
        add(&repo, "Crab Cakes", 0, 10).await;
        add(&repo, "Unrelated", 0, 10).await;
        let names: Vec<_> = repo
            .search("ab", &QueryFilter::SEARCH)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.file.name)
            .collect();
        assert_eq!(names, vec!["Abbey Road Notes", "Crab Cakes"]);
    }

    #[tokio::test]
    async fn test_search_projection_has_no_updated_at() {
        let repo = repository().await;
        add(&repo, "Walden", 0, 10).await;
        let hits = repo.search("w", &QueryFilter::SEARCH).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].created_at.is_some());
        assert!(hits[0].updated_at.is_none());
    }

    #[tokio::test]
    async fn test_search_wildcards_are_literal() {
        let repo = repository().await;
        add(&repo, "100% Rust", 0, 10).await;
        add(&repo, "1000 Recipes", 0, 10).await;
        let hits = repo.search("100%", &QueryFilter::SEARCH).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file.name, "100% Rust");
    }

    #[tokio::test]
    async fn test_toggle_star_flips_and_stamps() {
        let repo = repository().await;
        let id = add(&repo, "Emma", 0, 10).await;
        let before = stored_updated_at(&repo, id).await;
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(repo.toggle_star(id).await.unwrap());
        let first = stored_updated_at(&repo, id).await;
        assert!(repo.get_one(id).await.unwrap().unwrap().file.is_starred);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(repo.toggle_star(id).await.unwrap());
        let second = stored_updated_at(&repo, id).await;
        assert!(!repo.get_one(id).await.unwrap().unwrap().file.is_starred);
        assert_ne!(before, first);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_toggle_star_missing_file() {
        let repo = repository().await;
        assert!(!repo.toggle_star(FileId::new(9)).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_total_pages_only_writes_changes() {
        let repo = repository().await;
        let id = add(&repo, "Ulysses", 0, 0).await;
        assert!(repo.update_total_pages(id, 730).await.unwrap());
        assert!(!repo.update_total_pages(id, 730).await.unwrap());
        assert!(!repo.update_total_pages(FileId::new(77), 730).await.unwrap());
        assert_eq!(repo.progress(id).await.unwrap().unwrap().total_pages, 730);
    }

    #[tokio::test]
    async fn test_save_progress_marks_started() {
        let repo = repository().await;
        let id = add(&repo, "Persuasion", 0, 250).await;
        assert!(repo.save_progress(id, 2, true).await.unwrap());
        let progress = repo.progress(id).await.unwrap().unwrap();
        assert!(progress.has_started);
        assert_eq!(progress.current_page, 2);
        assert!(!repo.save_progress(FileId::new(404), 2, true).await.unwrap());
    }

    #[tokio::test]
    async fn test_pending_delete_commit_or_drop() {
        let repo = repository().await;
        let kept = add(&repo, "kept", 0, 10).await;
        let removed = add(&repo, "removed", 0, 10).await;

        drop(repo.begin_delete(kept).await.unwrap());
        assert!(repo.get_one(kept).await.unwrap().is_some());

        let pending = repo.begin_delete(removed).await.unwrap();
        pending.commit().await.unwrap();
        assert!(repo.get_one(removed).await.unwrap().is_none());
        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM metadata WHERE file_id = ?")
            .bind(removed.get())
            .fetch_one(&repo.pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let repo = repository().await;
        add(&repo, "one", 0, 10).await;
        add(&repo, "two", 0, 10).await;
        assert_eq!(repo.clear().await.unwrap(), 2);
        assert_eq!(repo.count().await.unwrap(), 0);
        let metadata: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM metadata").fetch_one(&repo.pool).await.unwrap();
        assert_eq!(metadata, 0);
    }
}
