//! Layered configuration of the reader's on-device locations.
//!
//! Values are merged from, in increasing priority:
//! 1. platform defaults (the per-user data directory),
//! 2. a TOML file (`reda.toml` in the per-user config directory by default),
//! 3. `REDA_*` environment variables (`REDA_DATABASE`, `REDA_DOCUMENTS`,
//!    `REDA_PREFERENCES`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "REDA_";
const CONFIG_FILE: &str = "reda.toml";

/// Where the reader keeps its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite library database.
    pub database: PathBuf,
    /// Directory holding imported documents.
    pub documents: PathBuf,
    /// JSON file holding persisted preferences.
    pub preferences: PathBuf,
}

impl Config {
    /// All locations inside one directory, with the default file names.
    pub fn rooted_at(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            database: dir.join("reda.db"),
            documents: dir.join("documents"),
            preferences: dir.join("preferences.json"),
        }
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "reda").ok_or_raise(|| ErrorKind::NoHomeDirectory)
    }

    /// Platform defaults: everything in the per-user data directory.
    pub fn platform_defaults() -> Result<Self> {
        Ok(Self::rooted_at(Self::project_dirs()?.data_dir()))
    }

    /// The configuration file read by [`load()`](Self::load).
    pub fn default_file() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join(CONFIG_FILE))
    }

    /// Layer `file` and the environment over `defaults`.
    ///
    /// A missing file contributes nothing.
    pub fn figment(defaults: &Self, file: &Path) -> Figment {
        Figment::from(Serialized::defaults(defaults))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the configuration from the platform defaults, the default file
    /// and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::platform_defaults()?, &Self::default_file()?)
    }

    /// Load the configuration from explicit defaults and file.
    pub fn load_from(defaults: &Self, file: &Path) -> Result<Self> {
        let config: Self = Self::figment(defaults, file).extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        tracing::debug!(
            database = %config.database.display(),
            documents = %config.documents.display(),
            preferences = %config.preferences.display(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Every location must be an absolute path.
    pub fn validate(&self) -> Result<()> {
        for path in [&self.database, &self.documents, &self.preferences] {
            if !path.is_absolute() {
                exn::bail!(ErrorKind::RelativePath(path.clone()));
            }
        }
        Ok(())
    }
}
