//! The data-access façade over the document library.

mod home;
mod progress;

pub use self::home::{HomeFeed, HomePageData, Section};
pub use self::progress::ProgressOutcome;
use crate::error::{ErrorKind, Result};
use crate::host::{Confirmation, Dialog};
use exn::ResultExt;
use reda_config::Config;
use reda_database::{CombinedFile, Database, FileId, Listing, NewFile, NewMetadata, QueryFilter, Repository};
use reda_storage::{BackendHandle, StorageBackend};
use reda_storage::backend::LocalBackend;
use std::ops::Deref;
use std::sync::Arc;
use tracing::instrument;

/// The library shelves, as picked on the category screens.
pub use reda_database::Listing as Category;

/// Keywords shorter than this do not trigger a search while typing.
pub const MIN_SEARCH_LENGTH: usize = 2;

/// What [`RedaService::delete_file`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// No such file; the reader was not asked.
    NotFound,
    /// The reader declined the confirmation prompt.
    Cancelled,
    /// The rows and the stored document are gone.
    Deleted,
}

/// Single access point for reading and writing the document library.
///
/// Cheap to clone: every clone shares the same connection pool, storage
/// backend and dialog.
#[derive(Clone)]
pub struct RedaService {
    db: Database,
    repo: Repository,
    backend: BackendHandle,
    dialog: Arc<dyn Dialog>,
}

impl RedaService {
    pub fn new(db: Database, backend: BackendHandle, dialog: Arc<dyn Dialog>) -> Self {
        let repo = Repository::from(&db);
        Self { db, repo, backend, dialog }
    }

    /// Open the library database and the documents directory named by
    /// `config`, creating both if needed.
    #[instrument(skip_all)]
    pub async fn open(config: &Config, dialog: Arc<dyn Dialog>) -> Result<Self> {
        if let Some(parent) = config.database.parent() {
            tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Database)?;
        }
        let db = Database::connect(&config.database).await.or_raise(|| ErrorKind::Database)?;
        let backend = LocalBackend::new("documents", &config.documents).or_raise(|| ErrorKind::Storage)?;
        tracing::info!(documents = %config.documents.display(), "opened library");
        Ok(Self::new(db, Arc::new(backend), dialog))
    }

    /// Close the connection pool. The service must not be used afterwards.
    pub async fn close(&self) {
        self.db.close().await;
    }

    pub fn backend(&self) -> &BackendHandle {
        &self.backend
    }

    pub(crate) fn dialog(&self) -> &Arc<dyn Dialog> {
        &self.dialog
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Number of documents in the library.
    pub async fn count(&self) -> Result<u64> {
        self.repo.count().await.or_raise(|| ErrorKind::Database)
    }

    /// A document and its metadata, or `None` if there is no such document.
    pub async fn get_one(&self, id: FileId) -> Result<Option<CombinedFile>> {
        self.repo.get_one(id).await.or_raise(|| ErrorKind::Database)
    }

    /// The documents of one shelf; `None` applies the shelf's default filter.
    pub async fn list(&self, category: Category, filter: Option<QueryFilter>) -> Result<Vec<CombinedFile>> {
        let filter = filter.unwrap_or_else(|| category.default_filter());
        self.repo.list(category, &filter).await.or_raise(|| ErrorKind::Database)
    }

    /// The whole library, newest first by default (25 documents).
    pub async fn get_all(&self, filter: Option<QueryFilter>) -> Result<Vec<CombinedFile>> {
        self.list(Listing::All, filter).await
    }

    /// Starred documents, most recently touched first by default.
    pub async fn get_starred(&self, filter: Option<QueryFilter>) -> Result<Vec<CombinedFile>> {
        self.list(Listing::Starred, filter).await
    }

    /// Started documents, most recently read first by default.
    pub async fn get_continue_reading(&self, filter: Option<QueryFilter>) -> Result<Vec<CombinedFile>> {
        self.list(Listing::ContinueReading, filter).await
    }

    /// The three home screen shelves, loaded concurrently.
    ///
    /// Fails as a whole if any of the three reads fails.
    #[instrument(skip(self))]
    pub async fn load_home_page_data(&self) -> Result<HomePageData> {
        let (recently_added, starred, continue_reading) = futures::try_join!(
            self.get_all(None),
            self.get_starred(None),
            self.get_continue_reading(None),
        )?;
        Ok(HomePageData {
            recently_added,
            starred,
            continue_reading,
        })
    }

    /// The library size followed by the home screen shelves.
    pub async fn home_feed(&self) -> Result<HomeFeed> {
        let count = self.count().await?;
        let data = self.load_home_page_data().await?;
        Ok(HomeFeed { count, data })
    }

    /// Documents whose name contains `keyword`, ignoring case; oldest first
    /// by default (100 documents).
    ///
    /// Any keyword is searched, however short.
    #[instrument(skip(self))]
    pub async fn search(&self, keyword: &str, filter: Option<QueryFilter>) -> Result<Vec<CombinedFile>> {
        let filter = filter.unwrap_or(QueryFilter::SEARCH);
        self.repo.search(keyword, &filter).await.or_raise(|| ErrorKind::Database)
    }

    /// Search as the reader types.
    ///
    /// An empty keyword clears the results, a keyword shorter than
    /// [`MIN_SEARCH_LENGTH`] returns `None` (keep showing the previous
    /// results), anything longer runs [`search`](Self::search).
    pub async fn search_as_you_type(&self, keyword: &str) -> Result<Option<Vec<CombinedFile>>> {
        match keyword.chars().count() {
            0 => Ok(Some(Vec::new())),
            n if n < MIN_SEARCH_LENGTH => Ok(None),
            _ => self.search(keyword, None).await.map(Some),
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Add a document and its metadata to the library.
    #[instrument(skip_all, fields(name = %file.name))]
    pub async fn import(&self, file: NewFile, metadata: NewMetadata) -> Result<FileId> {
        let id = self.repo.insert(&file, &metadata).await.or_raise(|| ErrorKind::Database)?;
        tracing::info!(%id, "imported document");
        Ok(id)
    }

    /// Star or unstar a document. Returns `false` if there is no such
    /// document.
    #[instrument(skip(self))]
    pub async fn toggle_star(&self, id: FileId) -> Result<bool> {
        self.repo.toggle_star(id).await.or_raise(|| ErrorKind::Database)
    }

    /// Record the page count reported when a document is opened.
    ///
    /// Returns whether anything was written: nothing is for a missing
    /// document or an unchanged count.
    #[instrument(skip(self))]
    pub async fn update_total_pages_on_load(&self, id: FileId, total_pages: u32) -> Result<bool> {
        let written = self.repo.update_total_pages(id, total_pages).await.or_raise(|| ErrorKind::Database)?;
        if written {
            tracing::debug!(%id, total_pages, "stored page count");
        }
        Ok(written)
    }

    /// Save the page the reader is on, following [`ProgressOutcome`]'s rules.
    #[instrument(skip(self))]
    pub async fn save_current_page(&self, id: FileId, current_page: u32) -> Result<ProgressOutcome> {
        let Some(stored) = self.repo.progress(id).await.or_raise(|| ErrorKind::Database)? else {
            return Ok(ProgressOutcome::NotFound);
        };
        let outcome = progress::plan(stored, current_page);
        let ProgressOutcome::Saved { started } = outcome else {
            tracing::debug!(%id, ?outcome, stored = stored.current_page, "page not saved");
            return Ok(outcome);
        };
        let written = self.repo.save_progress(id, current_page, started).await.or_raise(|| ErrorKind::Database)?;
        // Deleted between the read and the write.
        if !written {
            return Ok(ProgressOutcome::NotFound);
        }
        Ok(outcome)
    }

    /// Delete a document after the reader confirms it.
    ///
    /// The metadata row, the file row and the stored document are removed
    /// together: the row deletions are only committed once the stored
    /// document is gone. A stored document that is already missing does not
    /// stop the deletion. On failure the reader is alerted and the error is
    /// returned.
    #[instrument(skip(self))]
    pub async fn delete_file(&self, id: FileId) -> Result<Deletion> {
        let Some(file) = self.get_one(id).await? else {
            return Ok(Deletion::NotFound);
        };
        let prompt = Confirmation::new("Confirm", format!("Are you sure you want to delete {}?", file.file.name))
            .confirm_label("Delete")
            .destructive();
        if !self.dialog.confirm(prompt).await {
            return Ok(Deletion::Cancelled);
        }
        match self.remove(&file).await {
            Ok(()) => {
                tracing::info!(%id, name = %file.file.name, "deleted document");
                Ok(Deletion::Deleted)
            },
            Err(e) => {
                tracing::error!(%id, error = ?e, "failed to delete document");
                self.dialog.alert("Error", "Failed to delete!").await;
                Err(e)
            },
        }
    }

    /// Delete the rows, then the stored document, then commit.
    ///
    /// The write transaction stays open while the document is deleted, so
    /// concurrent writers (a progress save) wait for it on the busy timeout.
    /// Everything that can fail without touching storage runs before it opens.
    async fn remove(&self, file: &CombinedFile) -> Result<()> {
        let location = self.backend.locate(&file.file.path).or_raise(|| ErrorKind::Storage)?;
        let pending = self.repo.begin_delete(file.id()).await.or_raise(|| ErrorKind::Database)?;
        match self.backend.delete(&location).await {
            Ok(()) => {},
            Err(e) if e.deref().is_not_found() => {
                tracing::warn!(path = %location.display(), "stored document was already gone");
            },
            // Dropping `pending` rolls the row deletions back.
            Err(e) => return Err(e).or_raise(|| ErrorKind::Storage),
        }
        pending.commit().await.or_raise(|| ErrorKind::Database)
    }

    /// Delete every row of the library. Stored documents are left alone.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> Result<u64> {
        self.repo.clear().await.or_raise(|| ErrorKind::Database)
    }
}
