use crate::storage::Storage;
use crate::{utils, Result};
use anyhow::ensure;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Stores each key as `<dir>/<key>.json`.
///
/// A write goes to a hidden temporary file first and is then renamed over the real one, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates `dir` if it does not exist.
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        utils::make_dir(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{key}.json.tmp"))
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        utils::read_if_exists(&self.path(key)?).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path(key)?;
        let temp = self.temp_path(key);
        utils::write(&temp, value).await?;
        utils::rename(&temp, &path).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        utils::remove(&self.path(key)?).await
    }
}

/// Keys become file names, so only ASCII letters, digits, `-` and `_` are allowed.
fn validate_key(key: &str) -> Result<()> {
    ensure!(
        !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
        "Invalid storage key '{key}'"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_storage() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("storage")).await.unwrap();
        assert!(storage.dir().is_dir());

        assert_eq!(storage.get("finance-storage").await.unwrap(), None);
        storage
            .set("finance-storage", "{}".to_string())
            .await
            .unwrap();
        assert!(storage.dir().join("finance-storage.json").is_file());
        assert!(!storage.dir().join(".finance-storage.json.tmp").exists());
        assert_eq!(
            storage.get("finance-storage").await.unwrap().as_deref(),
            Some("{}")
        );

        storage
            .set("finance-storage", "[]".to_string())
            .await
            .unwrap();
        assert_eq!(
            storage.get("finance-storage").await.unwrap().as_deref(),
            Some("[]")
        );

        storage.remove("finance-storage").await.unwrap();
        storage.remove("finance-storage").await.unwrap();
        assert_eq!(storage.get("finance-storage").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_bad_keys() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).await.unwrap();
        assert!(storage.get("../escape").await.is_err());
        assert!(storage.set("", String::new()).await.is_err());
        assert!(storage.remove("a/b").await.is_err());
    }
}
