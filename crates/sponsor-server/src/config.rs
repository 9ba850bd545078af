//! Server configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `sponsor.{toml,json,yaml}` in the working directory, then `SPONSOR_*`
//! environment variables.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Which persistence backend serves the storage port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per record type, rewritten on every change
    File,
    /// Process-local maps, lost on restart
    Memory,
    /// Embedded SQLite database
    Sqlite,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub storage: StorageBackend,
    /// Holds the JSON files of the file backend and the default database
    pub data_dir: PathBuf,
    pub database_path: Option<PathBuf>,
    /// Telegram id that is marked admin on first login
    pub admin_telegram_id: Option<String>,
    /// Built mini-app bundle; served with an `index.html` fallback
    pub static_dir: Option<PathBuf>,
    pub image_host_url: Option<String>,
    pub image_host_api_key: Option<String>,
    pub max_upload_bytes: usize,
    pub seed_sample_data: bool,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load from `sponsor.*` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::with_name("sponsor").required(false))
            .add_source(Environment::with_prefix("SPONSOR"))
            .build()?
            .try_deserialize()
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("sponsor.db"))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            storage: StorageBackend::Sqlite,
            data_dir: PathBuf::from("./data"),
            database_path: None,
            admin_telegram_id: None,
            static_dir: None,
            image_host_url: None,
            image_host_api_key: None,
            max_upload_bytes: 5 * 1024 * 1024,
            seed_sample_data: false,
            log_format: LogFormat::Pretty,
        }
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("bind_address", "0.0.0.0:3000")?
        .set_default("storage", "sqlite")?
        .set_default("data_dir", "./data")?
        .set_default("max_upload_bytes", 5_i64 * 1024 * 1024)?
        .set_default("seed_sample_data", false)?
        .set_default("log_format", "pretty")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_default_impl() {
        let loaded: ServerConfig = defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        let expected = ServerConfig::default();

        assert_eq!(loaded.bind_address, expected.bind_address);
        assert_eq!(loaded.storage, expected.storage);
        assert_eq!(loaded.data_dir, expected.data_dir);
        assert_eq!(loaded.max_upload_bytes, expected.max_upload_bytes);
        assert_eq!(loaded.log_format, LogFormat::Pretty);
        assert!(loaded.admin_telegram_id.is_none());
        assert!(!loaded.seed_sample_data);
    }

    #[test]
    fn test_overrides() {
        let loaded: ServerConfig = defaults()
            .unwrap()
            .set_override("storage", "memory")
            .unwrap()
            .set_override("admin_telegram_id", "42")
            .unwrap()
            .set_override("seed_sample_data", "true")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(loaded.storage, StorageBackend::Memory);
        assert_eq!(loaded.admin_telegram_id.as_deref(), Some("42"));
        assert!(loaded.seed_sample_data);
    }

    #[test]
    fn test_database_path_defaults_into_data_dir() {
        let mut config = ServerConfig {
            data_dir: PathBuf::from("/var/lib/sponsor"),
            ..Default::default()
        };
        assert_eq!(config.database_path(), PathBuf::from("/var/lib/sponsor/sponsor.db"));

        config.database_path = Some(PathBuf::from("/tmp/x.db"));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/x.db"));
    }
}
