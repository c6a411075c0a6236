use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::storage::document::Document;

use super::currency;
use super::portfolio_id::PortfolioId;

/// A single holding. Owned by exactly one [`Portfolio`]; it has no
/// lifecycle of its own and is never mutated after it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    /// Ticker symbol as listed (e.g. "TSLA", "KINV-B")
    pub ticker: String,

    /// ISO-4217 code of the currency the stock is quoted in, stored as given
    pub base_currency: String,

    /// Whole number of shares held
    pub number_of_shares: u32,
}

impl Stock {
    pub fn new(ticker: impl Into<String>, base_currency: impl Into<String>, number_of_shares: u32) -> Self {
        Self {
            ticker: ticker.into(),
            base_currency: base_currency.into(),
            number_of_shares,
        }
    }

    /// Check the holding is well-formed: a non-empty ticker and a
    /// three-letter currency code.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.ticker.trim().is_empty() {
            return Err(CoreError::Validation("Stock ticker must not be empty".into()));
        }
        currency::validate_code(&self.base_currency)
    }

    /// Currency codes compare case-insensitively.
    pub fn is_quoted_in(&self, currency: &str) -> bool {
        self.base_currency.eq_ignore_ascii_case(currency)
    }
}

/// Aggregate root: a set of holdings plus audit and soft-delete fields.
///
/// The soft-delete pair (`deleted`, `deleted_on_utc`) is only ever written
/// together through [`Portfolio::set_soft_delete`], so one is never set
/// without the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    #[serde(rename = "_id")]
    id: PortfolioId,

    /// Advisory figure seeded at creation; valuations are always recomputed
    current_total_value: Decimal,

    #[serde(default)]
    stocks: Vec<Stock>,

    created_on_utc: DateTime<Utc>,

    #[serde(default)]
    modified_on_utc: Option<DateTime<Utc>>,

    #[serde(default)]
    deleted_on_utc: Option<DateTime<Utc>>,

    #[serde(default)]
    deleted: bool,
}

impl Portfolio {
    /// Create an empty portfolio with a fresh identifier.
    pub fn create(current_total_value: Decimal, created_on_utc: DateTime<Utc>) -> Self {
        Self::with_id(PortfolioId::new(), current_total_value, created_on_utc)
    }

    pub fn with_id(id: PortfolioId, current_total_value: Decimal, created_on_utc: DateTime<Utc>) -> Self {
        Self {
            id,
            current_total_value,
            stocks: Vec::new(),
            created_on_utc,
            modified_on_utc: None,
            deleted_on_utc: None,
            deleted: false,
        }
    }

    pub fn id(&self) -> PortfolioId {
        self.id
    }

    pub fn current_total_value(&self) -> Decimal {
        self.current_total_value
    }

    pub fn stocks(&self) -> &[Stock] {
        &self.stocks
    }

    pub fn created_on_utc(&self) -> DateTime<Utc> {
        self.created_on_utc
    }

    pub fn modified_on_utc(&self) -> Option<DateTime<Utc>> {
        self.modified_on_utc
    }

    pub fn deleted_on_utc(&self) -> Option<DateTime<Utc>> {
        self.deleted_on_utc
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Append a holding. Earlier holdings are left untouched; a malformed
    /// holding is rejected and the portfolio stays as it was.
    pub fn add_stock(&mut self, stock: Stock) -> Result<(), CoreError> {
        stock.validate()?;
        self.stocks.push(stock);
        Ok(())
    }

    pub fn set_modified_date(&mut self, at: DateTime<Utc>) {
        self.modified_on_utc = Some(at);
    }

    /// Mark the portfolio as logically removed. Stamps the modification
    /// date as well as the deletion date.
    pub fn set_soft_delete(&mut self, at: DateTime<Utc>) {
        self.modified_on_utc = Some(at);
        self.deleted_on_utc = Some(at);
        self.deleted = true;
    }
}

impl Document for Portfolio {
    type Id = PortfolioId;

    const COLLECTION: &'static str = "Portfolios";

    fn document_id(&self) -> PortfolioId {
        self.id
    }
}
