use std::marker::PhantomData;
use std::sync::Arc;

use crate::errors::CoreError;

use super::document::{from_document, Document};
use super::store::DocumentStore;

/// Typed read handle on one collection of a [`DocumentStore`].
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Document> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn find_all(&self) -> Result<Vec<T>, CoreError> {
        self.store
            .find_all(&self.name)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    pub async fn find_by_id(&self, id: &T::Id) -> Result<Option<T>, CoreError> {
        self.store
            .find_by_id(&self.name, &id.to_string())
            .await?
            .map(from_document)
            .transpose()
    }

    pub async fn find_by_ids(&self, ids: &[T::Id]) -> Result<Vec<T>, CoreError> {
        let keys: Vec<String> = ids.iter().map(ToString::to_string).collect();
        self.store
            .find_by_ids(&self.name, &keys)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}
