use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::errors::CoreError;

/// Entity kind key used in [`ServiceSettings::collections`] for portfolios.
pub const PORTFOLIO_ENTITY: &str = "portfolio";

/// Document store location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseOptions {
    /// Path of the redb file backing the document store.
    pub path: String,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            path: "portfolio-service.redb".to_string(),
        }
    }
}

/// Access to the currencylayer-style exchange rate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeRateApiOptions {
    pub token: String,
    pub base_api_address: String,
    pub timeout_secs: u64,
}

impl Default for ExchangeRateApiOptions {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_api_address: "http://api.currencylayer.com".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    pub exchange_rate_ttl_hours: u64,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            exchange_rate_ttl_hours: 24,
        }
    }
}

impl CacheOptions {
    pub fn exchange_rate_ttl(&self) -> Duration {
        Duration::from_secs(self.exchange_rate_ttl_hours * 60 * 60)
    }
}

/// Service configuration. Every section falls back to its defaults when
/// missing from the JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub database: DatabaseOptions,
    pub exchange_rate_api: ExchangeRateApiOptions,
    pub cache: CacheOptions,

    /// Entity kind → collection name. Resolved once when a repository is built.
    pub collections: HashMap<String, String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        let mut collections = HashMap::new();
        collections.insert(PORTFOLIO_ENTITY.to_string(), "Portfolios".to_string());
        Self {
            database: DatabaseOptions::default(),
            exchange_rate_api: ExchangeRateApiOptions::default(),
            cache: CacheOptions::default(),
            collections,
        }
    }
}

impl ServiceSettings {
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|e| CoreError::Config(format!("Invalid settings: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("Cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    /// Apply `PORTFOLIO_*` environment variables on top of the loaded values.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::with_env_overrides`] with an explicit variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("PORTFOLIO_DB_PATH") {
            self.database.path = path;
        }
        if let Some(token) = lookup("PORTFOLIO_EXCHANGE_RATE_TOKEN") {
            self.exchange_rate_api.token = token;
        }
        if let Some(url) = lookup("PORTFOLIO_EXCHANGE_RATE_BASE_URL") {
            self.exchange_rate_api.base_api_address = url;
        }
        self
    }

    /// Collection configured for an entity kind, if any.
    pub fn collection_for(&self, entity: &str) -> Option<&str> {
        self.collections.get(entity).map(String::as_str)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.database.path.trim().is_empty() {
            return Err(CoreError::Config("database.path is required".into()));
        }
        if self.exchange_rate_api.token.trim().is_empty() {
            return Err(CoreError::Config("exchange_rate_api.token is required".into()));
        }
        if self.exchange_rate_api.base_api_address.trim().is_empty() {
            return Err(CoreError::Config(
                "exchange_rate_api.base_api_address is required".into(),
            ));
        }
        if self.cache.exchange_rate_ttl_hours == 0 {
            return Err(CoreError::Config(
                "cache.exchange_rate_ttl_hours must be greater than zero".into(),
            ));
        }
        if self.collections.values().any(|name| name.trim().is_empty()) {
            return Err(CoreError::Config("collection names must not be empty".into()));
        }
        Ok(())
    }
}
