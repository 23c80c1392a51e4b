//! Configuration management for plotledger.
//!
//! Settings resolve in order: built-in defaults, then `config.toml` in the
//! data directory, then the `DATABASE_URL` environment (loaded from `.env`
//! by the binary), then command-line flags.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::util::validate_database_url;
use crate::repository::{DbContext, DbError};

/// Database filename inside the data directory.
pub const DEFAULT_DATABASE_FILENAME: &str = "registry.db";

/// Optional config file inside the data directory.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid database URL: {0}")]
    InvalidDatabaseUrl(String),
}

/// On-disk configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Database URL override (sqlite path or postgres URL).
    pub database_url: Option<String>,
    /// Database filename inside the data directory.
    pub database_filename: Option<String>,
}

/// Resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    /// Supports sqlite paths and postgres:// URLs. Set via DATABASE_URL or
    /// config.toml.
    pub database_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        // Falls back gracefully: local data dir -> home dir -> current dir
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("plotledger");

        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Load settings, layering config.toml and the environment over defaults.
    pub fn load(
        data_dir: Option<PathBuf>,
        database_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut settings = match data_dir {
            Some(dir) => Self::with_data_dir(dir),
            None => Self::default(),
        };

        let config_path = settings.data_dir.join(CONFIG_FILENAME);
        if config_path.exists() {
            let raw = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
                path: config_path.clone(),
                source,
            })?;
            let file: ConfigFile = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: config_path.clone(),
                source,
            })?;

            if let Some(filename) = file.database_filename {
                settings.database_filename = filename;
            }
            if file.database_url.is_some() {
                settings.database_url = file.database_url;
            }
        }

        // CLI flag / DATABASE_URL wins over the config file.
        if database_url.is_some() {
            settings.database_url = database_url;
        }

        if let Some(ref url) = settings.database_url {
            validate_database_url(url).map_err(ConfigError::InvalidDatabaseUrl)?;
        }

        Ok(settings)
    }

    /// Get the database URL, constructing from the data dir if not set.
    pub fn database_url(&self) -> String {
        match self.database_url {
            Some(ref url) => url.clone(),
            None => self.database_path().display().to_string(),
        }
    }

    /// Path of the SQLite database inside the data directory.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Whether the configured database is PostgreSQL.
    pub fn is_postgres(&self) -> bool {
        self.database_url
            .as_deref()
            .is_some_and(crate::repository::util::is_postgres_url)
    }

    /// Create the data directory if needed.
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)
    }

    /// Create a database context for the configured URL.
    pub fn create_db_context(&self) -> Result<DbContext, DbError> {
        DbContext::from_url(&self.database_url())
    }
}
