use async_trait::async_trait;
use parking_lot::Mutex;
use redb::{Database, ReadableTable, TableDefinition, TableHandle, WriteTransaction};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::errors::CoreError;

use super::store::{DocumentStore, Operation, StoreSession};

/// Every collection is one redb table: document id → JSON bytes.
fn table(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

fn decode(bytes: &[u8]) -> Result<Value, CoreError> {
    serde_json::from_slice(bytes)
        .map_err(|e| CoreError::Deserialization(format!("Corrupted document: {e}")))
}

/// Embedded, file-backed document store.
pub struct RedbDocumentStore {
    db: Arc<Database>,
}

impl RedbDocumentStore {
    /// Open (or create) the database file and make sure every collection
    /// the service uses exists before any repository touches it.
    pub fn open(path: impl AsRef<Path>, collections: &[&str]) -> Result<Self, CoreError> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.ensure_collections(collections)?;
        Ok(store)
    }

    fn ensure_collections(&self, collections: &[&str]) -> Result<(), CoreError> {
        let txn = self.db.begin_write()?;
        for name in collections {
            txn.open_table(table(name))?;
        }
        txn.commit()?;
        log::debug!("redb collections ready: {collections:?}");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RedbDocumentStore {
    fn name(&self) -> &str {
        "redb"
    }

    async fn collection_names(&self) -> Result<Vec<String>, CoreError> {
        let txn = self.db.begin_read()?;
        let mut names: Vec<String> = txn
            .list_tables()?
            .map(|handle| handle.name().to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Value>, CoreError> {
        let txn = self.db.begin_read()?;
        let docs = match txn.open_table(table(collection)) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut out = Vec::new();
        for entry in docs.iter()? {
            let (_, value) = entry?;
            out.push(decode(value.value())?);
        }
        Ok(out)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, CoreError> {
        let txn = self.db.begin_read()?;
        let docs = match txn.open_table(table(collection)) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let found = docs.get(id)?.map(|value| decode(value.value())).transpose()?;
        Ok(found)
    }

    async fn find_by_ids(&self, collection: &str, ids: &[String]) -> Result<Vec<Value>, CoreError> {
        let txn = self.db.begin_read()?;
        let docs = match txn.open_table(table(collection)) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut wanted: Vec<&String> = ids.iter().collect();
        wanted.sort();
        wanted.dedup();

        let mut out = Vec::new();
        for id in wanted {
            if let Some(value) = docs.get(id.as_str())? {
                out.push(decode(value.value())?);
            }
        }
        Ok(out)
    }

    async fn start_session(&self) -> Result<Box<dyn StoreSession>, CoreError> {
        // redb admits a single writer; waiting for it must not stall the runtime.
        let db = self.db.clone();
        let txn = tokio::task::spawn_blocking(move || db.begin_write())
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to open write transaction: {e}")))??;
        Ok(Box::new(RedbSession {
            txn: Mutex::new(Some(txn)),
        }))
    }
}

struct RedbSession {
    txn: Mutex<Option<WriteTransaction>>,
}

impl RedbSession {
    fn take(&self) -> Result<WriteTransaction, CoreError> {
        self.txn
            .lock()
            .take()
            .ok_or_else(|| CoreError::Storage("Transaction already finished".into()))
    }
}

#[async_trait]
impl StoreSession for RedbSession {
    async fn apply(&self, operation: &Operation) -> Result<(), CoreError> {
        let guard = self.txn.lock();
        let txn = guard
            .as_ref()
            .ok_or_else(|| CoreError::Storage("Transaction already finished".into()))?;
        let mut docs = txn.open_table(table(operation.collection()))?;

        match operation {
            Operation::Insert {
                collection,
                id,
                document,
            } => {
                if docs.get(id.as_str())?.is_some() {
                    return Err(CoreError::DuplicateKey {
                        collection: collection.clone(),
                        id: id.clone(),
                    });
                }
                let bytes = serde_json::to_vec(document)
                    .map_err(|e| CoreError::Serialization(e.to_string()))?;
                docs.insert(id.as_str(), bytes.as_slice())?;
            }
            Operation::Replace { id, document, .. } => {
                let exists = docs.get(id.as_str())?.is_some();
                if exists {
                    let bytes = serde_json::to_vec(document)
                        .map_err(|e| CoreError::Serialization(e.to_string()))?;
                    docs.insert(id.as_str(), bytes.as_slice())?;
                }
            }
            Operation::Delete { id, .. } => {
                docs.remove(id.as_str())?;
            }
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        self.take()?.commit()?;
        Ok(())
    }

    async fn abort(self: Box<Self>) -> Result<(), CoreError> {
        self.take()?.abort()?;
        Ok(())
    }
}
