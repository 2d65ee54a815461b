//! Durable key-value storage for store snapshots.
//!
//! Each store keeps its full state under one fixed key as a JSON envelope:
//!
//! ```json
//! { "version": 1, "state": { ... } }
//! ```
//!
//! Stores never wait on storage while mutating. They hand each new snapshot to a [`Persister`],
//! a background task that writes snapshots in the order they were produced.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::Result;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

/// The snapshot envelope version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Unstructured durable storage: string values under string keys.
#[async_trait]
pub trait Storage: Debug + Send + Sync {
    /// Returns the value stored under `key`, or `None` if nothing has been stored.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// The full serializable state of a store.
pub trait Snapshot: Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The fixed storage key this state lives under.
    const KEY: &'static str;
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    state: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: u32,
    state: T,
}

/// Serializes `state` into the envelope format.
pub(crate) fn encode<T: Snapshot>(state: &T) -> Result<String> {
    serde_json::to_string(&EnvelopeRef {
        version: SNAPSHOT_VERSION,
        state,
    })
    .with_context(|| format!("Unable to serialize the '{}' snapshot", T::KEY))
}

/// Parses an envelope produced by [`encode`], refusing versions newer than this build knows.
pub(crate) fn decode<T: Snapshot>(json: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(json)
        .with_context(|| format!("Failed to parse the '{}' snapshot", T::KEY))?;
    anyhow::ensure!(
        envelope.version <= SNAPSHOT_VERSION,
        "The '{}' snapshot has version {} but only versions up to {} are supported. Is a newer \
        version of pocket available?",
        T::KEY,
        envelope.version,
        SNAPSHOT_VERSION
    );
    Ok(envelope.state)
}

/// Loads the snapshot stored under `T::KEY`, falling back to `T::default()` when there is none.
pub(crate) async fn load<T: Snapshot>(storage: &dyn Storage) -> Result<T> {
    match storage.get(T::KEY).await? {
        Some(json) => {
            debug!("Rehydrating '{}' from storage", T::KEY);
            decode(&json)
        }
        None => {
            debug!("No '{}' snapshot found, starting from defaults", T::KEY);
            Ok(T::default())
        }
    }
}

enum Message {
    Save(String),
    Flush(oneshot::Sender<Result<()>>),
}

/// Writes snapshots for one storage key on a background tokio task.
///
/// Snapshots are written in the order they are scheduled. A failed write is logged and kept until
/// the next [`Persister::flush`], which reports it.
#[derive(Debug, Clone)]
pub(crate) struct Persister {
    key: &'static str,
    tx: mpsc::UnboundedSender<Message>,
}

impl Persister {
    /// Spawns the writer task. Must be called from within a tokio runtime.
    pub(crate) fn spawn(storage: Arc<dyn Storage>, key: &'static str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(write_loop(storage, key, rx));
        Self { key, tx }
    }

    /// Serializes `state` and queues it for writing. Returns without waiting for the write.
    pub(crate) fn schedule<T: Snapshot>(&self, state: &T) {
        let json = match encode(state) {
            Ok(json) => json,
            Err(e) => {
                warn!("Not persisting '{}': {e:#}", self.key);
                return;
            }
        };
        if self.tx.send(Message::Save(json)).is_err() {
            warn!("The '{}' writer has stopped, a snapshot was dropped", self.key);
        }
    }

    /// Waits until every snapshot scheduled so far has been written. Returns the most recent
    /// write error since the previous flush, if any.
    pub(crate) async fn flush(&self) -> Result<()> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(Message::Flush(reply))
            .map_err(|_| anyhow!("The '{}' writer has stopped", self.key))?;
        done.await
            .with_context(|| format!("The '{}' writer stopped before flushing", self.key))?
    }
}

async fn write_loop(
    storage: Arc<dyn Storage>,
    key: &'static str,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    let mut failure = None;
    while let Some(message) = rx.recv().await {
        match message {
            Message::Save(json) => {
                trace!("Writing '{key}' ({} bytes)", json.len());
                if let Err(e) = storage.set(key, json).await {
                    warn!("Unable to persist '{key}': {e:#}");
                    failure = Some(e);
                }
            }
            Message::Flush(reply) => {
                let result = match failure.take() {
                    Some(e) => Err(e),
                    None => Ok(()),
                };
                // The caller may have given up waiting.
                let _ = reply.send(result);
            }
        }
    }
    trace!("The '{key}' writer is done");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
    struct Counter {
        count: u32,
    }

    impl Snapshot for Counter {
        const KEY: &'static str = "counter";
    }

    #[test]
    fn test_encode_decode() {
        let json = encode(&Counter { count: 3 }).unwrap();
        assert_eq!(json, r#"{"version":1,"state":{"count":3}}"#);
        let back: Counter = decode(&json).unwrap();
        assert_eq!(back.count, 3);
    }

    #[test]
    fn test_decode_newer_version_fails() {
        let result = decode::<Counter>(r#"{"version":2,"state":{"count":3}}"#);
        assert!(result.unwrap_err().to_string().contains("newer version"));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode::<Counter>("not json").is_err());
    }

    #[tokio::test]
    async fn test_load_missing_is_default() {
        let storage = MemoryStorage::new();
        let loaded: Counter = load(&storage).await.unwrap();
        assert_eq!(loaded, Counter::default());
    }

    #[tokio::test]
    async fn test_persister_writes_in_order() {
        let storage = MemoryStorage::new();
        let persister = Persister::spawn(Arc::new(storage.clone()), Counter::KEY);
        for count in 1..=20 {
            persister.schedule(&Counter { count });
        }
        persister.flush().await.unwrap();
        let loaded: Counter = load(&storage).await.unwrap();
        assert_eq!(loaded.count, 20);
    }

    #[tokio::test]
    async fn test_persister_reports_failure_once() {
        let storage = MemoryStorage::new();
        let persister = Persister::spawn(Arc::new(storage.clone()), Counter::KEY);
        storage.fail_writes(true);
        persister.schedule(&Counter { count: 1 });
        assert!(persister.flush().await.is_err());
        // The failure has been reported, and nothing new has failed.
        assert!(persister.flush().await.is_ok());

        storage.fail_writes(false);
        persister.schedule(&Counter { count: 2 });
        persister.flush().await.unwrap();
        let loaded: Counter = load(&storage).await.unwrap();
        assert_eq!(loaded.count, 2);
    }
}
