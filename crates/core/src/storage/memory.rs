use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::errors::CoreError;

use super::store::{DocumentStore, Operation, StoreSession};

type Collection = BTreeMap<String, Value>;
type Collections = HashMap<String, Collection>;

/// Process-local document store.
///
/// A session takes the store's write lock for its whole lifetime and works
/// on a staged copy of the data; commit swaps the copy in. Readers wait
/// while a session is open, so they never observe half a batch.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    data: Arc<RwLock<Collections>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose collections already exist (empty).
    pub fn with_collections(names: &[&str]) -> Self {
        let data = names
            .iter()
            .map(|name| (name.to_string(), Collection::new()))
            .collect();
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Number of documents currently committed in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.data
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

impl std::fmt::Debug for MemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDocumentStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn collection_names(&self) -> Result<Vec<String>, CoreError> {
        let mut names: Vec<String> = self.data.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Value>, CoreError> {
        Ok(self
            .data
            .read()
            .await
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, CoreError> {
        Ok(self
            .data
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id).cloned()))
    }

    async fn find_by_ids(&self, collection: &str, ids: &[String]) -> Result<Vec<Value>, CoreError> {
        let data = self.data.read().await;
        let Some(docs) = data.get(collection) else {
            return Ok(Vec::new());
        };
        let mut wanted: Vec<&String> = ids.iter().collect();
        wanted.sort();
        wanted.dedup();
        Ok(wanted
            .into_iter()
            .filter_map(|id| docs.get(id).cloned())
            .collect())
    }

    async fn start_session(&self) -> Result<Box<dyn StoreSession>, CoreError> {
        let guard = self.data.clone().write_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemorySession {
            guard,
            staged: Mutex::new(staged),
        }))
    }
}

struct MemorySession {
    guard: OwnedRwLockWriteGuard<Collections>,
    staged: Mutex<Collections>,
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn apply(&self, operation: &Operation) -> Result<(), CoreError> {
        let mut staged = self.staged.lock();
        let docs = staged.entry(operation.collection().to_string()).or_default();
        match operation {
            Operation::Insert {
                collection,
                id,
                document,
            } => {
                if docs.contains_key(id) {
                    return Err(CoreError::DuplicateKey {
                        collection: collection.clone(),
                        id: id.clone(),
                    });
                }
                docs.insert(id.clone(), document.clone());
            }
            Operation::Replace { id, document, .. } => {
                if let Some(existing) = docs.get_mut(id) {
                    *existing = document.clone();
                }
            }
            Operation::Delete { id, .. } => {
                docs.remove(id);
            }
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        let MemorySession { mut guard, staged } = *self;
        *guard = staged.into_inner();
        Ok(())
    }

    async fn abort(self: Box<Self>) -> Result<(), CoreError> {
        // Dropping the guard releases the lock; the staged copy goes with it.
        Ok(())
    }
}
