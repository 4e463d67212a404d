//! Preferences persisted as a single JSON object on disk.

use super::KeyValueStore;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// Preference store backed by a JSON file.
///
/// The file is read on first access and cached; every write rewrites the
/// whole file through a temporary sibling and a rename, so a crash never
/// leaves a half-written file behind. A missing file is an empty store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    cache: Mutex<Option<Map<String, Value>>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<Map<String, Value>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no preference file yet");
                return Ok(Map::new());
            },
            Err(e) => exn::bail!(ErrorKind::Io(e)),
        };
        match serde_json::from_slice::<Value>(&bytes).or_raise(|| ErrorKind::Corrupt(self.path.clone()))? {
            Value::Object(map) => Ok(map),
            _ => exn::bail!(ErrorKind::Corrupt(self.path.clone())),
        }
    }

    async fn write_file(&self, values: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_vec_pretty(values).or_raise(|| ErrorKind::Serialization)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(ErrorKind::Io)?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).await.map_err(ErrorKind::Io)?;
        fs::rename(&staging, &self.path).await.map_err(ErrorKind::Io)?;
        Ok(())
    }

    /// Apply `change` to the cached values and persist them.
    ///
    /// The cache is only updated once the file was written.
    async fn update(&self, change: impl FnOnce(&mut Map<String, Value>) + Send) -> Result<()> {
        let mut guard = self.cache.lock().await;
        let mut values = match guard.as_ref() {
            Some(values) => values.clone(),
            None => self.read_file().await?,
        };
        change(&mut values);
        self.write_file(&values).await?;
        *guard = Some(values);
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut guard = self.cache.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_file().await?);
        }
        Ok(guard.as_ref().and_then(|values| values.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.update(|values| {
            values.insert(key.to_string(), value);
        })
        .await
    }
}
