//! The settings façade.
//!
//! [`Settings`] owns the one copy of [`SettingsState`]. Every change goes
//! through a [`SettingsAction`] applied by [`reduce`]; consumers only ever
//! see read-only snapshots, either on demand or through a
//! [`watch`](tokio::sync::watch) receiver.

mod state;

pub use self::state::{SettingsAction, SettingsState, reduce};
use crate::error::{ErrorKind, Result};
use crate::host::{Confirmation, NotificationPermissions};
use crate::service::RedaService;
use exn::ResultExt;
use reda_config::Config;
use reda_preferences::{JsonFileStore, Key, KeyValueStore, StoreHandle};
use reda_storage::StorageBackend;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::instrument;

pub struct Settings {
    store: StoreHandle,
    library: RedaService,
    permissions: Arc<dyn NotificationPermissions>,
    state: watch::Sender<SettingsState>,
}

impl Settings {
    /// Settings starting from the defaults; call [`load()`](Self::load) to
    /// read the persisted values.
    pub fn new(store: StoreHandle, library: RedaService, permissions: Arc<dyn NotificationPermissions>) -> Self {
        let (state, _) = watch::channel(SettingsState::default());
        Self {
            store,
            library,
            permissions,
            state,
        }
    }

    /// Settings persisted in the preference file named by `config`.
    pub fn open(config: &Config, library: RedaService, permissions: Arc<dyn NotificationPermissions>) -> Self {
        Self::new(Arc::new(JsonFileStore::new(&config.preferences)), library, permissions)
    }

    /// The current settings.
    pub fn snapshot(&self) -> SettingsState {
        *self.state.borrow()
    }

    /// A receiver that sees every future change.
    pub fn subscribe(&self) -> watch::Receiver<SettingsState> {
        self.state.subscribe()
    }

    fn dispatch(&self, action: SettingsAction) {
        self.state.send_modify(|state| *state = reduce(*state, action));
        tracing::debug!(?action, "settings changed");
    }

    async fn read_flag(&self, key: Key) -> Result<bool> {
        let value = self.store.get_bool(key.as_str()).await.or_raise(|| ErrorKind::Preferences)?;
        Ok(value.unwrap_or(false))
    }

    async fn write_flag(&self, key: Key, value: bool) -> Result<()> {
        self.store.set_bool(key.as_str(), value).await.or_raise(|| ErrorKind::Preferences)
    }

    /// Read the persisted settings; missing values are `false`.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<SettingsState> {
        let loaded = SettingsState {
            use_single_page_layout: self.read_flag(Key::SinglePageLayout).await?,
            allow_notifications: self.read_flag(Key::AllowNotifications).await?,
        };
        self.dispatch(SettingsAction::Loaded(loaded));
        Ok(loaded)
    }

    /// Switch between single- and two-page layout.
    ///
    /// The state only changes once the value is persisted.
    #[instrument(skip(self))]
    pub async fn toggle_single_page_layout(&self, value: bool) -> Result<()> {
        self.write_flag(Key::SinglePageLayout, value).await?;
        self.dispatch(SettingsAction::SetSinglePageLayout(value));
        Ok(())
    }

    /// Allow or forbid notifications.
    ///
    /// Enabling asks the host for notification permission first. The answer
    /// is only logged: the flag is stored either way.
    #[instrument(skip(self))]
    pub async fn toggle_allow_notifications(&self, value: bool) -> Result<()> {
        if value {
            match self.permissions.request().await {
                Ok(status) => tracing::info!(%status, "notification permission requested"),
                Err(e) => tracing::warn!(error = %e, "notification permission request failed"),
            }
        }
        self.write_flag(Key::AllowNotifications, value).await?;
        self.dispatch(SettingsAction::SetAllowNotifications(value));
        Ok(())
    }

    /// Reset the settings to their defaults once the reader confirms.
    ///
    /// Only the in-memory state is reset; the persisted values are read
    /// again by the next [`load()`](Self::load). Returns whether the reader
    /// confirmed.
    #[instrument(skip(self))]
    pub async fn reset_settings(&self) -> bool {
        let prompt = Confirmation::new("Reset Settings", "Are you sure you want to reset all settings to default?")
            .confirm_label("Reset")
            .destructive();
        if !self.library.dialog().confirm(prompt).await {
            return false;
        }
        self.dispatch(SettingsAction::Reset);
        true
    }

    /// Delete every stored document and every library row once the reader
    /// confirms.
    ///
    /// Both deletions run to completion concurrently; neither is undone when
    /// the other fails. The reader is alerted with the result. Returns whether
    /// the reader confirmed.
    #[instrument(skip(self))]
    pub async fn clear_all_data(&self) -> Result<bool> {
        let dialog = self.library.dialog();
        let prompt = Confirmation::new("Clear Data", "This will delete all files and app data, are you sure?")
            .confirm_label("Continue")
            .destructive();
        if !dialog.confirm(prompt).await {
            return Ok(false);
        }
        let (documents, rows) = futures::join!(
            async { self.library.backend().delete_all().await.or_raise(|| ErrorKind::Storage) },
            self.library.clear_all(),
        );
        let cleared = match (documents, rows) {
            (Ok(documents), Ok(rows)) => Ok((documents, rows)),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
            (Err(storage), Err(database)) => {
                tracing::error!(error = ?database, "failed to clear library database");
                Err(storage)
            },
        };
        match cleared {
            Ok((documents, rows)) => {
                tracing::info!(documents, rows, "cleared all data");
                dialog.alert("Success", "Data cleared! You may need to restart app to see changes.").await;
                Ok(true)
            },
            Err(e) => {
                tracing::error!(error = ?e, "failed to clear data");
                dialog.alert("Error", "An error occurred").await;
                Err(e)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::PermissionStatus;
    use crate::testing::{ReadOnlyStore, RefusingBackend, ScriptedDialog, ScriptedPermissions};
    use reda_database::{Database, Metadata, NewFile};
    use reda_preferences::MemoryStore;
    use reda_storage::backend::MockBackend;
    use serde_json::json;

    struct Fixture {
        settings: Settings,
        store: Arc<MemoryStore>,
        dialog: Arc<ScriptedDialog>,
        permissions: Arc<ScriptedPermissions>,
        backend: Arc<MockBackend>,
        library: RedaService,
    }

    async fn fixture_with(store: MemoryStore, confirm: bool, permissions: ScriptedPermissions) -> Fixture {
        let db = Database::connect_in_memory().await.unwrap();
        let backend = Arc::new(MockBackend::with_documents(["books/a.pdf"]));
        let dialog = Arc::new(ScriptedDialog::answering(confirm));
        let library = RedaService::new(db, backend.clone(), dialog.clone());
        let store = Arc::new(store);
        let permissions = Arc::new(permissions);
        let settings = Settings::new(store.clone(), library.clone(), permissions.clone());
        Fixture {
            settings,
            store,
            dialog,
            permissions,
            backend,
            library,
        }
    }

    async fn fixture(confirm: bool) -> Fixture {
        fixture_with(MemoryStore::new(), confirm, ScriptedPermissions::answering(PermissionStatus::Granted)).await
    }

    #[tokio::test]
    async fn test_load_defaults_to_false() {
        let f = fixture(true).await;
        assert_eq!(f.settings.load().await.unwrap(), SettingsState::default());
    }

    #[tokio::test]
    async fn test_load_reads_both_keys() {
        let store = MemoryStore::with_values([("SINGLE_PAGE_LAYOUT", json!(true)), ("ALLOW_NOTIFICATIONS", json!(true))]);
        let f = fixture_with(store, true, ScriptedPermissions::answering(PermissionStatus::Granted)).await;
        let mut changes = f.settings.subscribe();
        f.settings.load().await.unwrap();
        assert!(changes.has_changed().unwrap());
        let seen = *changes.borrow_and_update();
        assert_eq!(
            seen,
            SettingsState {
                use_single_page_layout: true,
                allow_notifications: true
            }
        );
        assert_eq!(f.settings.snapshot(), seen);
    }

    #[tokio::test]
    async fn test_toggle_single_page_layout_persists() {
        let f = fixture(true).await;
        f.settings.toggle_single_page_layout(true).await.unwrap();
        assert!(f.settings.snapshot().use_single_page_layout);
        assert_eq!(f.store.get_bool("SINGLE_PAGE_LAYOUT").await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn test_enabling_notifications_requests_permission() {
        let f = fixture(true).await;
        f.settings.toggle_allow_notifications(true).await.unwrap();
        assert_eq!(f.permissions.requests(), 1);
        assert!(f.settings.snapshot().allow_notifications);
        assert_eq!(f.store.get_bool("ALLOW_NOTIFICATIONS").await.unwrap(), Some(true));

        f.settings.toggle_allow_notifications(false).await.unwrap();
        assert_eq!(f.permissions.requests(), 1);
        assert!(!f.settings.snapshot().allow_notifications);
        assert_eq!(f.store.get_bool("ALLOW_NOTIFICATIONS").await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_notifications_stored_even_when_permission_fails() {
        let f = fixture_with(MemoryStore::new(), true, ScriptedPermissions::failing()).await;
        f.settings.toggle_allow_notifications(true).await.unwrap();
        assert!(f.settings.snapshot().allow_notifications);
        assert_eq!(f.store.get_bool("ALLOW_NOTIFICATIONS").await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn test_reset_confirmed_keeps_store() {
        let f = fixture(true).await;
        f.settings.toggle_single_page_layout(true).await.unwrap();
        assert!(f.settings.reset_settings().await);
        assert_eq!(f.settings.snapshot(), SettingsState::default());
        assert_eq!(f.store.get_bool("SINGLE_PAGE_LAYOUT").await.unwrap(), Some(true));
        let prompt = &f.dialog.prompts()[0];
        assert_eq!(prompt.title, "Reset Settings");
        assert_eq!(prompt.confirm_label, "Reset");
    }

    #[tokio::test]
    async fn test_reset_cancelled() {
        let f = fixture(false).await;
        f.settings.toggle_single_page_layout(true).await.unwrap();
        assert!(!f.settings.reset_settings().await);
        assert!(f.settings.snapshot().use_single_page_layout);
    }

    #[tokio::test]
    async fn test_clear_all_data() {
        let f = fixture(true).await;
        f.library.import(NewFile::new("a", "books/a.pdf", 1), Metadata::default()).await.unwrap();
        assert!(f.settings.clear_all_data().await.unwrap());
        assert_eq!(f.library.count().await.unwrap(), 0);
        assert!(!f.backend.contains("books/a.pdf").await);
        let prompt = &f.dialog.prompts()[0];
        assert_eq!(prompt.title, "Clear Data");
        assert_eq!(prompt.confirm_label, "Continue");
        assert_eq!(
            f.dialog.alerts(),
            vec![(
                "Success".to_string(),
                "Data cleared! You may need to restart app to see changes.".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_clear_all_data_cancelled() {
        let f = fixture(false).await;
        f.library.import(NewFile::new("a", "books/a.pdf", 1), Metadata::default()).await.unwrap();
        assert!(!f.settings.clear_all_data().await.unwrap());
        assert_eq!(f.library.count().await.unwrap(), 1);
        assert!(f.backend.contains("books/a.pdf").await);
        assert!(f.dialog.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_data_clears_rows_when_storage_fails() {
        let db = Database::connect_in_memory().await.unwrap();
        let dialog = Arc::new(ScriptedDialog::answering(true));
        let library = RedaService::new(db, Arc::new(RefusingBackend), dialog.clone());
        library.import(NewFile::new("a", "books/a.pdf", 1), Metadata::default()).await.unwrap();
        let permissions = Arc::new(ScriptedPermissions::answering(PermissionStatus::Granted));
        let settings = Settings::new(Arc::new(MemoryStore::new()), library.clone(), permissions);

        let err = settings.clear_all_data().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Storage));
        assert_eq!(library.count().await.unwrap(), 0);
        assert_eq!(dialog.alerts(), vec![("Error".to_string(), "An error occurred".to_string())]);
    }

    #[tokio::test]
    async fn test_failed_writes_leave_state_alone() {
        let f = fixture(true).await;
        let settings = Settings::new(Arc::new(ReadOnlyStore), f.library.clone(), f.permissions.clone());
        let mut changes = settings.subscribe();

        let err = settings.toggle_single_page_layout(true).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Preferences));
        let err = settings.toggle_allow_notifications(true).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Preferences));
        assert_eq!(settings.snapshot(), SettingsState::default());
        assert!(!changes.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_open_uses_preference_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::rooted_at(dir.path());
        let f = fixture(true).await;
        let settings = Settings::open(&config, f.library.clone(), f.permissions.clone());
        settings.toggle_single_page_layout(true).await.unwrap();
        let reopened = Settings::open(&config, f.library.clone(), f.permissions.clone());
        assert!(reopened.load().await.unwrap().use_single_page_layout);
    }
}
