//! Data access and settings for the Reda document reader.
//!
//! Screens talk to two façades:
//! - [`RedaService`] reads and writes the document library (an embedded
//!   SQLite database plus the stored documents),
//! - [`Settings`] owns the reader's settings and the destructive "reset" and
//!   "clear all data" flows.
//!
//! Anything that needs the reader's attention (confirmation prompts, notices,
//! notification permission) is asked of the host through the traits in
//! [`host`].
//!
//! ```no_run
//! use exn::ResultExt;
//! use reda::{RedaService, Settings};
//! use reda::error::ErrorKind;
//! use reda::host::{Dialog, NotificationPermissions};
//! use reda_config::Config;
//! use std::sync::Arc;
//!
//! # async fn example(dialog: Arc<dyn Dialog>, permissions: Arc<dyn NotificationPermissions>) -> reda::error::Result<()> {
//! let config = Config::load().or_raise(|| ErrorKind::Config)?;
//! let library = RedaService::open(&config, dialog).await?;
//! let settings = Settings::open(&config, library.clone(), permissions);
//! settings.load().await?;
//! for (section, files) in library.home_feed().await?.sections() {
//!     println!("{section}: {} documents", files.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod host;
mod service;
mod settings;
#[cfg(test)]
mod testing;

pub use crate::service::{
    Category, Deletion, HomeFeed, HomePageData, MIN_SEARCH_LENGTH, ProgressOutcome, RedaService, Section,
};
pub use crate::settings::{Settings, SettingsAction, SettingsState, reduce};
pub use reda_database::{
    Chapter, CombinedFile, File, FileId, Metadata, NewFile, NewMetadata, QueryFilter, SortColumn, SortOrder,
};
