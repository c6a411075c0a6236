use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::errors::CoreError;

/// Key/value cache with per-entry time-to-live.
///
/// Values are JSON so any backend (in-process map, shared external cache)
/// can hold them. Expired entries must read as absent.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError>;

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CoreError>;

    async fn remove(&self, key: &str) -> Result<(), CoreError>;
}

struct CachedValue {
    value: Value,
    expires_at: Instant,
}

/// In-process cache. Expiry is checked lazily on read.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, CachedValue>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, expired ones included until they are read or purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove expired entries.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, v| v.expires_at > now);
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, v| v.expires_at <= now);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CoreError> {
        self.entries.insert(
            key.to_string(),
            CachedValue {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
