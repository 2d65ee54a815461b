use crate::storage::Storage;
use crate::Result;
use anyhow::bail;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Keeps values in memory. Clones share the same map, so a test can hand one clone to a store and
/// inspect or reopen through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: Arc<Mutex<BTreeMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// While `fail` is true, every `set` and `remove` returns an error and changes nothing.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("Writes to '{key}' are disabled");
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.check_writable(key)?;
        let _ = self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check_writable(key)?;
        let _ = self.values.lock().await.remove(key);
        Ok(())
    }
}

#[tokio::test]
async fn memory_storage_test() {
    let storage = MemoryStorage::new();
    let other = storage.clone();
    assert_eq!(storage.get("a").await.unwrap(), None);
    storage.set("a", "1".to_string()).await.unwrap();
    assert_eq!(other.get("a").await.unwrap().as_deref(), Some("1"));

    other.fail_writes(true);
    assert!(storage.set("a", "2".to_string()).await.is_err());
    assert!(storage.remove("a").await.is_err());
    assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("1"));

    other.fail_writes(false);
    storage.remove("a").await.unwrap();
    storage.remove("a").await.unwrap();
    assert_eq!(storage.get("a").await.unwrap(), None);
}
