use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::portfolio::{Portfolio, Stock};

/// Outward representation of a holding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDto {
    pub ticker: String,
    pub base_currency: String,
    pub number_of_shares: u32,
}

/// Outward representation of a portfolio; audit and soft-delete fields stay internal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDto {
    pub id: String,
    pub current_total_value: Decimal,
    pub stocks: Vec<StockDto>,
}

/// Result of a valuation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalValueResponse {
    pub total_value: Decimal,
    pub currency: String,
}

impl From<&Stock> for StockDto {
    fn from(stock: &Stock) -> Self {
        Self {
            ticker: stock.ticker.clone(),
            base_currency: stock.base_currency.clone(),
            number_of_shares: stock.number_of_shares,
        }
    }
}

impl From<&Portfolio> for PortfolioDto {
    fn from(portfolio: &Portfolio) -> Self {
        Self {
            id: portfolio.id().to_string(),
            current_total_value: portfolio.current_total_value(),
            stocks: portfolio.stocks().iter().map(StockDto::from).collect(),
        }
    }
}
