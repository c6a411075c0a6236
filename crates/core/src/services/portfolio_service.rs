use chrono::Utc;
use futures::future::try_join_all;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::cancellation::{run_cancellable, CancellationToken};
use crate::errors::CoreError;
use crate::models::currency::{normalize_code, PIVOT_CURRENCY};
use crate::models::dto::{PortfolioDto, TotalValueResponse};
use crate::models::portfolio::Portfolio;
use crate::models::portfolio_id::PortfolioId;
use crate::providers::traits::StockPriceProvider;
use crate::storage::repository::PortfolioRepository;

use super::currency_service::CurrencyService;
use super::exchange_rate_service::ExchangeRateService;

/// Currency used when a valuation request does not name one.
pub const DEFAULT_CURRENCY: &str = PIVOT_CURRENCY;

/// The three portfolio operations exposed to the outside: fetch, soft
/// delete, and valuation in a requested currency.
///
/// Identifiers arrive as strings and are validated before any I/O.
/// Soft-deleted portfolios are reported as not found.
pub struct PortfolioService {
    repository: PortfolioRepository,
    exchange_rates: Arc<ExchangeRateService>,
    stock_prices: Arc<dyn StockPriceProvider>,
    currency_service: CurrencyService,
}

impl PortfolioService {
    pub fn new(
        repository: PortfolioRepository,
        exchange_rates: Arc<ExchangeRateService>,
        stock_prices: Arc<dyn StockPriceProvider>,
    ) -> Self {
        Self {
            repository,
            exchange_rates,
            stock_prices,
            currency_service: CurrencyService::new(),
        }
    }

    pub fn repository(&self) -> &PortfolioRepository {
        &self.repository
    }

    pub async fn get_portfolio(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<PortfolioDto, CoreError> {
        let portfolio_id = parse_request_id(id)?;
        let portfolio = self.load_active(portfolio_id, id, cancel).await?;
        Ok(PortfolioDto::from(&portfolio))
    }

    /// Soft-delete: stamp the deletion, queue the replace, commit.
    /// The repository's hard `remove` is never used here.
    pub async fn delete_portfolio(&self, id: &str, cancel: &CancellationToken) -> Result<(), CoreError> {
        let portfolio_id = parse_request_id(id)?;
        let mut portfolio = self.load_active(portfolio_id, id, cancel).await?;

        portfolio.set_soft_delete(Utc::now());
        self.repository.update(&portfolio)?;
        self.repository.unit_of_work().save_changes(cancel).await?;

        log::info!("portfolio {portfolio_id} soft-deleted");
        Ok(())
    }

    /// Sum of `converted unit price × shares` over every holding.
    ///
    /// Prices for all holdings are fetched concurrently. Rates are only
    /// fetched when at least one holding is quoted in another currency;
    /// if they are needed but unavailable the whole computation fails.
    pub async fn get_total_value(
        &self,
        id: &str,
        currency: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<TotalValueResponse, CoreError> {
        let portfolio_id = parse_request_id(id)?;
        let target = normalize_code(currency.unwrap_or(DEFAULT_CURRENCY))?;
        let portfolio = self.load_active(portfolio_id, id, cancel).await?;

        let prices = run_cancellable(
            cancel,
            try_join_all(
                portfolio
                    .stocks()
                    .iter()
                    .map(|stock| self.stock_prices.current_price(&stock.ticker)),
            ),
        )
        .await?;

        let needs_rates = portfolio.stocks().iter().any(|s| !s.is_quoted_in(&target));
        let rates = if needs_rates {
            let quote = self
                .exchange_rates
                .get_rates(cancel)
                .await?
                .ok_or(CoreError::RatesUnavailable)?;
            Some(quote)
        } else {
            None
        };

        let mut total = Decimal::ZERO;
        for (stock, price) in portfolio.stocks().iter().zip(prices) {
            let base = stock.base_currency.to_ascii_uppercase();
            let value = self.currency_service.convert_holding(
                price.price,
                stock.number_of_shares,
                &base,
                &target,
                rates.as_ref(),
            )?;
            total = total
                .checked_add(value)
                .ok_or_else(|| {
                    CoreError::ValuationOverflow(format!("total of portfolio {portfolio_id}"))
                })?;
        }

        log::debug!(
            "portfolio {portfolio_id} valued at {total} {target} over {} holdings",
            portfolio.stocks().len()
        );
        Ok(TotalValueResponse {
            total_value: total,
            currency: target,
        })
    }

    async fn load_active(
        &self,
        portfolio_id: PortfolioId,
        raw_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Portfolio, CoreError> {
        match run_cancellable(cancel, self.repository.get_by_id(&portfolio_id)).await? {
            Some(portfolio) if !portfolio.is_deleted() => Ok(portfolio),
            _ => Err(CoreError::PortfolioNotFound(raw_id.to_string())),
        }
    }
}

/// Reject a missing id before trying to parse it.
fn parse_request_id(id: &str) -> Result<PortfolioId, CoreError> {
    if id.trim().is_empty() {
        return Err(CoreError::Validation("Id is required!".into()));
    }
    PortfolioId::parse(id)
}
