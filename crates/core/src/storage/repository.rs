use std::sync::Arc;

use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

use super::collection::Collection;
use super::document::{to_document, Document};
use super::store::Operation;
use super::unit_of_work::UnitOfWork;

/// CRUD façade over one collection.
///
/// Reads hit the store immediately. `add`, `update` and `remove` only
/// enqueue an operation on the owning [`UnitOfWork`]; call
/// `unit_of_work().save_changes(..)` to make them durable.
pub struct Repository<T: Document> {
    unit_of_work: Arc<UnitOfWork>,
    collection: Collection<T>,
}

pub type PortfolioRepository = Repository<Portfolio>;

impl<T: Document> Repository<T> {
    /// Bind to the entity's default collection.
    pub fn new(unit_of_work: Arc<UnitOfWork>) -> Self {
        Self::with_collection(unit_of_work, T::COLLECTION)
    }

    /// Bind to an explicitly configured collection.
    pub fn with_collection(unit_of_work: Arc<UnitOfWork>, collection: &str) -> Self {
        let collection = unit_of_work.collection(collection);
        Self {
            unit_of_work,
            collection,
        }
    }

    pub fn unit_of_work(&self) -> &Arc<UnitOfWork> {
        &self.unit_of_work
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    pub async fn get_all(&self) -> Result<Vec<T>, CoreError> {
        self.collection.find_all().await
    }

    /// `Ok(None)` when no document carries this id.
    pub async fn get_by_id(&self, id: &T::Id) -> Result<Option<T>, CoreError> {
        self.collection.find_by_id(id).await
    }

    pub async fn get_by_ids(&self, ids: &[T::Id]) -> Result<Vec<T>, CoreError> {
        self.collection.find_by_ids(ids).await
    }

    pub fn add(&self, entity: &T) -> Result<(), CoreError> {
        self.unit_of_work.add_command(Operation::Insert {
            collection: self.collection.name().to_string(),
            id: entity.document_id().to_string(),
            document: to_document(entity)?,
        });
        Ok(())
    }

    pub fn update(&self, entity: &T) -> Result<(), CoreError> {
        self.unit_of_work.add_command(Operation::Replace {
            collection: self.collection.name().to_string(),
            id: entity.document_id().to_string(),
            document: to_document(entity)?,
        });
        Ok(())
    }

    pub fn remove(&self, id: &T::Id) {
        self.unit_of_work.add_command(Operation::Delete {
            collection: self.collection.name().to_string(),
            id: id.to_string(),
        });
    }
}
