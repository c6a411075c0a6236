use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CoreError;

/// A single deferred mutation, recorded when a repository asks for it and
/// executed when the owning unit of work commits.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Insert a new document. Fails if the id is already taken.
    Insert {
        collection: String,
        id: String,
        document: Value,
    },
    /// Replace the document with the same id. No-op when it does not exist.
    Replace {
        collection: String,
        id: String,
        document: Value,
    },
    /// Delete by id. No-op when it does not exist.
    Delete { collection: String, id: String },
}

impl Operation {
    pub fn collection(&self) -> &str {
        match self {
            Operation::Insert { collection, .. }
            | Operation::Replace { collection, .. }
            | Operation::Delete { collection, .. } => collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Operation::Insert { id, .. }
            | Operation::Replace { id, .. }
            | Operation::Delete { id, .. } => id,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Insert { .. } => "insert",
            Operation::Replace { .. } => "replace",
            Operation::Delete { .. } => "delete",
        }
    }
}

/// Backend holding JSON documents in named collections.
///
/// Reads go straight to the store; writes only happen through a
/// [`StoreSession`], which makes a batch of operations durable together.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    async fn collection_names(&self) -> Result<Vec<String>, CoreError>;

    /// All documents of a collection. An unknown collection is simply empty.
    async fn find_all(&self, collection: &str) -> Result<Vec<Value>, CoreError>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>, CoreError>;

    /// Documents whose id is in `ids`. Unknown ids are skipped, order is not guaranteed.
    async fn find_by_ids(&self, collection: &str, ids: &[String]) -> Result<Vec<Value>, CoreError>;

    /// Open a transaction. Nothing applied through it is visible to readers
    /// until [`StoreSession::commit`] succeeds.
    async fn start_session(&self) -> Result<Box<dyn StoreSession>, CoreError>;
}

/// An open transaction against a [`DocumentStore`].
///
/// `apply` takes `&self` so that a whole batch can be driven concurrently.
/// Dropping a session without committing discards its changes.
#[async_trait]
pub trait StoreSession: Send + Sync {
    async fn apply(&self, operation: &Operation) -> Result<(), CoreError>;

    async fn commit(self: Box<Self>) -> Result<(), CoreError>;

    async fn abort(self: Box<Self>) -> Result<(), CoreError>;
}
