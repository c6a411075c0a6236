use std::sync::Arc;
use std::time::Duration;

use crate::cancellation::{run_cancellable, CancellationToken};
use crate::errors::CoreError;
use crate::models::quote::Quote;
use crate::providers::traits::ExchangeRateSource;
use crate::storage::cache::CacheStore;

/// Cache key of the exchange-rate snapshot.
pub const CACHE_KEY: &str = "exchange_rate_data";

/// Default lifetime of a cached snapshot.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Serves the latest exchange-rate snapshot, calling the source at most
/// once per TTL window.
///
/// Cache strategy:
/// - **Hit**: a cached snapshot younger than the TTL is returned as is.
/// - **Miss**: the source is called once; a non-empty snapshot is cached
///   for the TTL and returned.
/// - **Failure / no rates**: nothing is cached. Failures propagate,
///   an empty answer comes back as `Ok(None)`.
///
/// Two concurrent misses may both call the source; the last write wins.
pub struct ExchangeRateService {
    source: Arc<dyn ExchangeRateSource>,
    cache: Arc<dyn CacheStore>,
    access_key: String,
    ttl: Duration,
}

impl ExchangeRateService {
    pub fn new(
        source: Arc<dyn ExchangeRateSource>,
        cache: Arc<dyn CacheStore>,
        access_key: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            cache,
            access_key: access_key.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_rates(&self, cancel: &CancellationToken) -> Result<Option<Quote>, CoreError> {
        if let Some(cached) = run_cancellable(cancel, self.cache.get(CACHE_KEY)).await? {
            match serde_json::from_value::<Quote>(cached) {
                Ok(quote) => {
                    log::debug!("exchange rates served from cache");
                    return Ok(Some(quote));
                }
                // An unreadable entry is treated as a miss and overwritten below.
                Err(e) => log::warn!("discarding unreadable cached exchange rates: {e}"),
            }
        }

        log::debug!("exchange rate cache miss, calling {}", self.source.name());
        let fetched = match run_cancellable(cancel, self.source.fetch_quotes(&self.access_key)).await {
            Ok(fetched) => fetched,
            Err(e) => {
                if !matches!(e, CoreError::Cancelled) {
                    log::warn!("{} failed: {e}", self.source.name());
                }
                return Err(e);
            }
        };

        match fetched {
            Some(quote) if !quote.is_empty() => {
                let value = serde_json::to_value(&quote)
                    .map_err(|e| CoreError::Serialization(format!("Failed to cache exchange rates: {e}")))?;
                run_cancellable(cancel, self.cache.set(CACHE_KEY, value, self.ttl)).await?;
                Ok(Some(quote))
            }
            _ => {
                log::warn!("{} returned no exchange rates", self.source.name());
                Ok(None)
            }
        }
    }

    /// Drop the cached snapshot so the next call goes to the source.
    pub async fn invalidate(&self) -> Result<(), CoreError> {
        self.cache.remove(CACHE_KEY).await
    }
}
