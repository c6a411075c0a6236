use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;

use crate::errors::CoreError;
use super::traits::{StockPrice, StockPriceProvider};

const BASE_CURRENCIES: [&str; 5] = ["USD", "SEK", "NOK", "CAD", "EUR"];

/// Stand-in market data: a random whole price in `[20, 800)` and a random
/// base currency on every call, whatever the ticker.
#[derive(Debug, Default)]
pub struct SyntheticStockPriceProvider;

impl SyntheticStockPriceProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StockPriceProvider for SyntheticStockPriceProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    async fn current_price(&self, ticker: &str) -> Result<StockPrice, CoreError> {
        if ticker.trim().is_empty() {
            return Err(CoreError::Validation("Ticker must not be empty".into()));
        }
        let mut rng = rand::thread_rng();
        let price: i64 = rng.gen_range(20..800);
        let base_currency = BASE_CURRENCIES[rng.gen_range(0..BASE_CURRENCIES.len())];
        Ok(StockPrice {
            price: Decimal::from(price),
            base_currency: base_currency.to_string(),
        })
    }
}
