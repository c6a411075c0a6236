use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::errors::CoreError;

/// Well-known field holding a document's identifier.
pub const ID_FIELD: &str = "_id";

/// An entity that is persisted as one JSON document in a named collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Typed identifier; its `Display` form is what gets stored under [`ID_FIELD`].
    type Id: std::fmt::Display + Send + Sync;

    /// Default collection for this entity kind.
    const COLLECTION: &'static str;

    fn document_id(&self) -> Self::Id;
}

/// Serialize an entity into the document shape stored in a collection.
pub fn to_document<T: Document>(entity: &T) -> Result<Value, CoreError> {
    let value = serde_json::to_value(entity)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize document: {e}")))?;
    match value.get(ID_FIELD) {
        Some(Value::String(id)) if *id == entity.document_id().to_string() => Ok(value),
        _ => Err(CoreError::Serialization(format!(
            "Document for collection {} must carry its id in '{ID_FIELD}'",
            T::COLLECTION
        ))),
    }
}

pub fn from_document<T: Document>(value: Value) -> Result<T, CoreError> {
    serde_json::from_value(value)
        .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize document: {e}")))
}
