//! Scripted host doubles shared by the façade tests.

use crate::host::{Confirmation, Dialog, NotificationPermissions, PermissionError, PermissionStatus};
use async_trait::async_trait;
use reda_preferences::KeyValueStore;
use reda_storage::StorageBackend;
use reda_storage::backend::DocumentStream;
use serde_json::Value;
use std::io::{Error as IoError, ErrorKind as IoKind};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers every prompt the same way and records what was shown.
pub(crate) struct ScriptedDialog {
    answer: bool,
    prompts: Mutex<Vec<Confirmation>>,
    alerts: Mutex<Vec<(String, String)>>,
}

impl ScriptedDialog {
    pub(crate) fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<Confirmation> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn alerts(&self) -> Vec<(String, String)> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dialog for ScriptedDialog {
    async fn confirm(&self, prompt: Confirmation) -> bool {
        self.prompts.lock().unwrap().push(prompt);
        self.answer
    }

    async fn alert(&self, title: &str, message: &str) {
        self.alerts.lock().unwrap().push((title.to_string(), message.to_string()));
    }
}

/// Answers every permission request with a fixed status, or fails.
pub(crate) struct ScriptedPermissions {
    status: Option<PermissionStatus>,
    requests: AtomicUsize,
}

impl ScriptedPermissions {
    pub(crate) fn answering(status: PermissionStatus) -> Self {
        Self {
            status: Some(status),
            requests: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            status: None,
            requests: AtomicUsize::new(0),
        }
    }

    pub(crate) fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationPermissions for ScriptedPermissions {
    async fn request(&self) -> Result<PermissionStatus, PermissionError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.status.ok_or_else(|| PermissionError {
            reason: "no permission service".to_string(),
        })
    }
}

/// Holds one document, `books/a.pdf`, and refuses to delete anything.
pub(crate) struct RefusingBackend;

#[async_trait]
impl StorageBackend for RefusingBackend {
    fn name(&self) -> &str {
        "refusing"
    }

    fn documents(&self) -> DocumentStream<'_> {
        Box::pin(futures::stream::iter([Ok(PathBuf::from("books/a.pdf"))]))
    }

    async fn delete(&self, path: &Path) -> reda_storage::error::Result<()> {
        exn::bail!(reda_storage::error::ErrorKind::PermissionDenied(path.to_path_buf()))
    }
}

/// Reads as empty and fails every write.
pub(crate) struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> reda_preferences::error::Result<Option<Value>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Value) -> reda_preferences::error::Result<()> {
        exn::bail!(reda_preferences::error::ErrorKind::Io(IoError::from(IoKind::ReadOnlyFilesystem)))
    }
}
