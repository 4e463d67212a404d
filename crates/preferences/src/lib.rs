//! Persisted key/value preferences.
//!
//! A handful of flags outlive the process: they are read once at startup
//! and written whenever the reader toggles them.

pub mod error;
mod key;
mod store;

pub use crate::key::Key;
pub use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};
use std::sync::Arc;

pub type StoreHandle = Arc<dyn KeyValueStore>;
