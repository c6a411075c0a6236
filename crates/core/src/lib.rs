pub mod cancellation;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use cancellation::CancellationToken;
use errors::CoreError;
use models::{
    dto::{PortfolioDto, TotalValueResponse},
    portfolio::Portfolio,
    settings::{ServiceSettings, PORTFOLIO_ENTITY},
};
use providers::{
    currencylayer::CurrencyLayerClient,
    synthetic::SyntheticStockPriceProvider,
    traits::StockPriceProvider,
};
use services::{exchange_rate_service::ExchangeRateService, portfolio_service::PortfolioService};
use storage::{
    cache::MemoryCacheStore,
    document::Document,
    redb_store::RedbDocumentStore,
    repository::PortfolioRepository,
    seed::PortfolioDataSeeder,
    store::DocumentStore,
    unit_of_work::UnitOfWork,
};

/// Main entry point for the portfolio service core.
///
/// Holds the long-lived, shared collaborators (document store, exchange
/// rate cache, price provider). Every operation gets its own
/// [`UnitOfWork`], so sessions are never shared between concurrent requests.
#[must_use]
pub struct PortfolioServiceCore {
    store: Arc<dyn DocumentStore>,
    exchange_rates: Arc<ExchangeRateService>,
    stock_prices: Arc<dyn StockPriceProvider>,
    portfolio_collection: String,
}

impl std::fmt::Debug for PortfolioServiceCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioServiceCore")
            .field("store", &self.store.name())
            .field("stock_prices", &self.stock_prices.name())
            .field("portfolio_collection", &self.portfolio_collection)
            .field("rates_ttl", &self.exchange_rates.ttl())
            .finish()
    }
}

impl PortfolioServiceCore {
    /// Build the production wiring: redb document store, currencylayer
    /// rates behind an in-memory cache, synthetic stock prices.
    pub fn from_settings(settings: &ServiceSettings) -> Result<Self, CoreError> {
        settings.validate()?;

        let collection = settings
            .collection_for(PORTFOLIO_ENTITY)
            .unwrap_or(Portfolio::COLLECTION)
            .to_string();
        let store = RedbDocumentStore::open(&settings.database.path, &[collection.as_str()])?;

        let exchange_rates = ExchangeRateService::new(
            Arc::new(CurrencyLayerClient::from_options(&settings.exchange_rate_api)),
            Arc::new(MemoryCacheStore::new()),
            settings.exchange_rate_api.token.clone(),
            settings.cache.exchange_rate_ttl(),
        );

        log::info!(
            "portfolio service ready (db: {}, collection: {collection})",
            settings.database.path
        );

        Ok(Self::with_components(
            Arc::new(store),
            Arc::new(exchange_rates),
            Arc::new(SyntheticStockPriceProvider::new()),
            &collection,
        ))
    }

    /// Wire explicit collaborators (other stores, fake sources in tests).
    pub fn with_components(
        store: Arc<dyn DocumentStore>,
        exchange_rates: Arc<ExchangeRateService>,
        stock_prices: Arc<dyn StockPriceProvider>,
        portfolio_collection: &str,
    ) -> Self {
        Self {
            store,
            exchange_rates,
            stock_prices,
            portfolio_collection: portfolio_collection.to_string(),
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn exchange_rates(&self) -> &Arc<ExchangeRateService> {
        &self.exchange_rates
    }

    /// A fresh unit of work over the shared store.
    pub fn new_unit_of_work(&self) -> Arc<UnitOfWork> {
        Arc::new(UnitOfWork::new(self.store.clone()))
    }

    /// A portfolio repository bound to its own fresh unit of work.
    pub fn portfolio_repository(&self) -> PortfolioRepository {
        PortfolioRepository::with_collection(self.new_unit_of_work(), &self.portfolio_collection)
    }

    fn portfolio_service(&self) -> PortfolioService {
        PortfolioService::new(
            self.portfolio_repository(),
            self.exchange_rates.clone(),
            self.stock_prices.clone(),
        )
    }

    // ── Portfolio operations ────────────────────────────────────────

    pub async fn get_portfolio(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<PortfolioDto, CoreError> {
        self.portfolio_service().get_portfolio(id, cancel).await
    }

    pub async fn delete_portfolio(&self, id: &str, cancel: &CancellationToken) -> Result<(), CoreError> {
        self.portfolio_service().delete_portfolio(id, cancel).await
    }

    /// Total value in `currency` (USD when `None`).
    pub async fn get_total_value(
        &self,
        id: &str,
        currency: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<TotalValueResponse, CoreError> {
        self.portfolio_service()
            .get_total_value(id, currency, cancel)
            .await
    }

    // ── Data ────────────────────────────────────────────────────────

    /// Insert the demo portfolios if the collection is empty.
    pub async fn seed(&self, cancel: &CancellationToken) -> Result<usize, CoreError> {
        let repository = self.portfolio_repository();
        PortfolioDataSeeder::new(&repository).seed_all(cancel).await
    }
}
