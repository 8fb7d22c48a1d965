use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use kanal::{AsyncReceiver, AsyncSender};
use lexi_types::StorageChange;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Persistent key-value collaborator
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write a value; subscribers are notified when it actually changed
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Change notifications, delivered in write order
    fn subscribe(&self) -> AsyncReceiver<StorageChange>;
}

/// Fan-out of change notifications
#[derive(Default)]
struct Subscribers {
    senders: Mutex<Vec<AsyncSender<StorageChange>>>,
}

impl Subscribers {
    fn subscribe(&self) -> AsyncReceiver<StorageChange> {
        let (tx, rx) = kanal::unbounded_async();
        if let Ok(mut senders) = self.senders.lock() {
            senders.push(tx);
        }
        rx
    }

    fn notify(&self, change: StorageChange) {
        let Ok(mut senders) = self.senders.lock() else {
            return;
        };
        // Closed receivers are dropped from the list
        senders.retain(|tx| matches!(tx.try_send(change.clone()), Ok(true)));
    }
}

/// Volatile store, used by tests and when no file is configured
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Self {
            values: RwLock::new(values.into_iter().collect()),
            subscribers: Subscribers::default(),
        }
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let previous = self
            .values
            .write()
            .await
            .insert(key.to_string(), value.clone());
        if previous.as_ref() != Some(&value) {
            self.subscribers.notify(StorageChange {
                key: key.to_string(),
                new_value: Some(value),
            });
        }
        Ok(())
    }

    fn subscribe(&self) -> AsyncReceiver<StorageChange> {
        self.subscribers.subscribe()
    }
}

/// All keys in one pretty-printed JSON object file
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<Map<String, Value>>,
    subscribers: Subscribers,
}

impl JsonFileStore {
    /// Open the store file; a missing file is an empty store
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = if tokio::fs::try_exists(&path).await? {
            let data = tokio::fs::read_to_string(&path).await?;
            if data.trim().is_empty() {
                Map::new()
            } else {
                match serde_json::from_str::<Value>(&data)? {
                    Value::Object(map) => map,
                    other => {
                        return Err(StoreError::Format(format!(
                            "{} holds {} instead of an object",
                            path.display(),
                            json_kind(&other)
                        )));
                    }
                }
            }
        } else {
            tracing::info!("No store file at {}, starting empty", path.display());
            Map::new()
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
            subscribers: Subscribers::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait::async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let changed = {
            let mut values = self.values.write().await;
            if values.get(key) == Some(&value) {
                false
            } else {
                values.insert(key.to_string(), value.clone());
                let data = serde_json::to_string_pretty(&*values)?;
                if let Some(dir) = self.path.parent()
                    && !dir.as_os_str().is_empty()
                {
                    tokio::fs::create_dir_all(dir).await?;
                }
                tokio::fs::write(&self.path, data).await?;
                true
            }
        };

        if changed {
            tracing::debug!("Stored '{}' in {}", key, self.path.display());
            self.subscribers.notify(StorageChange {
                key: key.to_string(),
                new_value: Some(value),
            });
        }
        Ok(())
    }

    fn subscribe(&self) -> AsyncReceiver<StorageChange> {
        self.subscribers.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tokio::time::timeout;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("lexi-store-{}-{}.json", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_memory_store_notifies_on_change_only() {
        let store = MemoryStore::new();
        let rx = store.subscribe();

        store.set("clueMode", json!(true)).await.unwrap();
        store.set("clueMode", json!(true)).await.unwrap();
        store.set("clueMode", json!(false)).await.unwrap();

        let first = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert_eq!(first.key, "clueMode");
        assert_eq!(first.new_value, Some(json!(true)));
        let second = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert_eq!(second.new_value, Some(json!(false)));
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_pruned() {
        let store = MemoryStore::new();
        drop(store.subscribe());
        let rx = store.subscribe();

        store.set("k", json!(1)).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().new_value, Some(json!(1)));
        assert_eq!(store.subscribers.senders.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_json_file_store_round_trips_through_disk() {
        let path = temp_path("roundtrip");
        let _ = std::fs::remove_file(&path);

        let store = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(store.get("vocabularyList").await.unwrap(), None);
        store
            .set("vocabularyList", json!(["serendipity"]))
            .await
            .unwrap();

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("vocabularyList").await.unwrap(),
            Some(json!(["serendipity"]))
        );
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_json_file_store_rejects_non_object() {
        let path = temp_path("array");
        std::fs::write(&path, "[1, 2]").unwrap();

        let err = JsonFileStore::open(&path).await.err().unwrap();
        assert!(matches!(err, StoreError::Format(_)));
        let _ = std::fs::remove_file(&path);
    }
}
