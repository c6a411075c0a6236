use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::currency;

/// Point-in-time exchange-rate snapshot as returned by the rate source.
///
/// Rates are pivoted on USD: `quotes["USDSEK"]` is the number of SEK per
/// one USD. A snapshot is never mutated after it was fetched; a refresh
/// replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub success: bool,

    #[serde(default)]
    pub terms: String,

    #[serde(default)]
    pub privacy: String,

    /// Unix seconds at which the rates were sampled
    #[serde(default)]
    pub timestamp: i64,

    /// Source (pivot) currency, "USD" for every snapshot we consume
    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub quotes: HashMap<String, Decimal>,
}

impl Quote {
    /// Build a snapshot from `(pair, rate)` entries, mostly useful for tests
    /// and seeding a cache by hand.
    pub fn from_rates<I, K>(timestamp: i64, rates: I) -> Self
    where
        I: IntoIterator<Item = (K, Decimal)>,
        K: Into<String>,
    {
        Self {
            success: true,
            terms: String::new(),
            privacy: String::new(),
            timestamp,
            source: currency::PIVOT_CURRENCY.to_string(),
            quotes: rates.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// A snapshot with no rates is as good as no snapshot at all.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Rate for a raw pair key such as "USDSEK".
    pub fn rate(&self, pair: &str) -> Option<Decimal> {
        self.quotes.get(pair).copied()
    }

    /// Units of `currency` per one unit of the pivot currency.
    pub fn rate_per_usd(&self, currency: &str) -> Option<Decimal> {
        self.rate(&currency::pivot_pair(currency))
    }
}
