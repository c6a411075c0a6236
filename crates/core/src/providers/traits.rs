use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::quote::Quote;

/// Source of exchange-rate snapshots (e.g. currencylayer's `/live` endpoint).
#[async_trait]
pub trait ExchangeRateSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the latest snapshot.
    ///
    /// `Ok(None)` means the source answered but had no rates to give.
    /// A failed call is `Err(CoreError::UpstreamUnavailable { .. })`.
    async fn fetch_quotes(&self, access_key: &str) -> Result<Option<Quote>, CoreError>;
}

/// Current price of one share and the currency it is quoted in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPrice {
    pub price: Decimal,
    pub base_currency: String,
}

/// Market data collaborator. No stability between calls is assumed.
#[async_trait]
pub trait StockPriceProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn current_price(&self, ticker: &str) -> Result<StockPrice, CoreError>;
}
