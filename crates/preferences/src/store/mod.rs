mod json;
mod memory;

pub use self::json::JsonFileStore;
pub use self::memory::MemoryStore;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A device-local key/value store for small persisted settings.
///
/// Values are JSON values so a store can hold more than flags, but the reader
/// itself only stores booleans (see [`get_bool()`](Self::get_bool)).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// The value stored under `key`, or `None` if it was never written.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// The boolean stored under `key`.
    ///
    /// A missing key and a value of another type both read as `None`.
    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        let value = self.get(key).await?;
        match value {
            None => Ok(None),
            Some(Value::Bool(flag)) => Ok(Some(flag)),
            Some(other) => {
                tracing::warn!(key, value = %other, "ignoring non-boolean preference");
                Ok(None)
            },
        }
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set(key, Value::Bool(value)).await
    }
}
