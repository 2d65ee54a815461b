//! Configuration file handling for pocket.
//!
//! The configuration file is stored at `$POCKET_HOME/config.json`. The persisted stores live next
//! to it in `$POCKET_HOME/storage`, one JSON file per store.

use crate::storage::FileStorage;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "pocket";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const STORAGE: &str = "storage";
const MIN_PIN_LENGTH: usize = 4;
const RECENT_COUNT: usize = 5;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$POCKET_HOME` and from there it loads `$POCKET_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    storage_dir: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its `storage` subdirectory and an initial `config.json` with
    /// default settings.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists, or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the pocket home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The config file already exists at '{}'",
                config_path.display()
            )
        }

        let storage_dir = root.join(STORAGE);
        utils::make_dir(&storage_dir).await?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            storage_dir,
            config_file,
        })
    }

    /// This will
    /// - validate that `pocket_home` and its config file exist
    /// - load the config file
    /// - validate that the storage directory exists
    pub async fn load(pocket_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = pocket_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Pocket home is missing, run 'pocket init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'pocket init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let storage_dir = root.join(STORAGE);
        if !storage_dir.is_dir() {
            bail!(
                "The storage directory is missing '{}'",
                storage_dir.display()
            )
        }

        Ok(Self {
            root,
            config_path,
            storage_dir,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// The shortest PIN the CLI accepts when setting one.
    pub fn min_pin_length(&self) -> usize {
        self.config_file.min_pin_length
    }

    /// How many transactions `history` shows when no limit is given.
    pub fn recent_count(&self) -> usize {
        self.config_file.recent_count
    }

    /// The file-backed storage the stores persist into.
    pub async fn storage(&self) -> Result<FileStorage> {
        FileStorage::new(&self.storage_dir).await
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "pocket",
///   "config_version": 1,
///   "min_pin_length": 4,
///   "recent_count": 5
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "pocket"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    #[serde(default = "default_min_pin_length")]
    min_pin_length: usize,

    #[serde(default = "default_recent_count")]
    recent_count: usize,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            min_pin_length: MIN_PIN_LENGTH,
            recent_count: RECENT_COUNT,
        }
    }
}

fn default_min_pin_length() -> usize {
    MIN_PIN_LENGTH
}

fn default_recent_count() -> usize {
    RECENT_COUNT
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, names another app, or was written by
    /// a newer version.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Config version {} is unsupported. Is a newer version of pocket available?",
            config.config_version
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("pocket_home");

        let created = Config::create(&home_dir).await.unwrap();
        assert!(created.storage_dir().is_dir());
        assert!(created.config_path().is_file());
        assert_eq!(created.min_pin_length(), 4);
        assert_eq!(created.recent_count(), 5);

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.root(), created.root());
        assert_eq!(loaded.config_file, created.config_file);
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path()).await.unwrap();
        let result = Config::create(dir.path()).await;
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("nope")).await.is_err());
        assert!(Config::load(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        utils::write(&config_path, r#"{"app_name": "pocket", "config_version": 1}"#)
            .await
            .unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        utils::write(&config_path, r#"{"app_name": "ledger", "config_version": 1}"#)
            .await
            .unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_load_newer_version() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        utils::write(&config_path, r#"{"app_name": "pocket", "config_version": 9}"#)
            .await
            .unwrap();

        assert!(ConfigFile::load(&config_path).await.is_err());
    }
}
