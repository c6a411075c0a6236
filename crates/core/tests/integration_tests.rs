use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use portfolio_service_core::cancellation::CancellationToken;
use portfolio_service_core::errors::CoreError;
use portfolio_service_core::models::portfolio::Portfolio;
use portfolio_service_core::models::quote::Quote;
use portfolio_service_core::models::settings::ServiceSettings;
use portfolio_service_core::providers::traits::{ExchangeRateSource, StockPrice, StockPriceProvider};
use portfolio_service_core::services::exchange_rate_service::{ExchangeRateService, DEFAULT_TTL};
use portfolio_service_core::storage::cache::MemoryCacheStore;
use portfolio_service_core::storage::document::Document;
use portfolio_service_core::storage::memory::MemoryDocumentStore;
use portfolio_service_core::storage::store::DocumentStore;
use portfolio_service_core::PortfolioServiceCore;

struct StaticRates;

#[async_trait]
impl ExchangeRateSource for StaticRates {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_quotes(&self, _access_key: &str) -> Result<Option<Quote>, CoreError> {
        Ok(Some(Quote::from_rates(
            0,
            [
                ("USDSEK", dec!(10)),
                ("USDNOK", dec!(10)),
                ("USDCAD", dec!(1.25)),
            ],
        )))
    }
}

/// Every share costs 10 regardless of ticker.
struct FlatPrice;

#[async_trait]
impl StockPriceProvider for FlatPrice {
    fn name(&self) -> &str {
        "flat"
    }

    async fn current_price(&self, _ticker: &str) -> Result<StockPrice, CoreError> {
        Ok(StockPrice {
            price: dec!(10),
            base_currency: "USD".into(),
        })
    }
}

fn core() -> PortfolioServiceCore {
    let exchange_rates = ExchangeRateService::new(
        Arc::new(StaticRates),
        Arc::new(MemoryCacheStore::new()),
        "key",
        DEFAULT_TTL,
    );
    PortfolioServiceCore::with_components(
        Arc::new(MemoryDocumentStore::with_collections(&[Portfolio::COLLECTION])),
        Arc::new(exchange_rates),
        Arc::new(FlatPrice),
        Portfolio::COLLECTION,
    )
}

// ═══════════════════════════════════════════════════════════════════
// Facade
// ═══════════════════════════════════════════════════════════════════

mod facade {
    use super::*;

    #[tokio::test]
    async fn seed_get_value_delete_lifecycle() {
        let core = core();
        let cancel = CancellationToken::new();

        assert_eq!(core.seed(&cancel).await.unwrap(), 2);
        assert_eq!(core.seed(&cancel).await.unwrap(), 0);

        let portfolios = core.portfolio_repository().get_all().await.unwrap();
        assert_eq!(portfolios.len(), 2);
        let first = portfolios
            .iter()
            .find(|p| p.stocks()[0].number_of_shares == 20)
            .unwrap();
        let id = first.id().to_string();

        let dto = core.get_portfolio(&id, &cancel).await.unwrap();
        assert_eq!(dto.stocks.len(), 5);

        // TSLA 20 + GME 100 in USD; KINV-B 50 SEK; BBD.B 100 CAD; NAS 20000 NOK
        // 200 + 1000 + 50 + 800 + 20000 = 22050 USD
        let usd = core.get_total_value(&id, None, &cancel).await.unwrap();
        assert_eq!(usd.total_value, dec!(22050));
        assert_eq!(usd.currency, "USD");

        let sek = core.get_total_value(&id, Some("sek"), &cancel).await.unwrap();
        assert_eq!(sek.total_value, dec!(220500));
        assert_eq!(sek.currency, "SEK");

        core.delete_portfolio(&id, &cancel).await.unwrap();
        assert!(core.get_portfolio(&id, &cancel).await.unwrap_err().is_not_found());
        assert_eq!(core.portfolio_repository().get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn each_repository_gets_its_own_unit_of_work() {
        let core = core();
        let a = core.portfolio_repository();
        let b = core.portfolio_repository();

        a.add(&Portfolio::create(Decimal::ZERO, chrono::Utc::now())).unwrap();

        assert_eq!(a.unit_of_work().pending_commands(), 1);
        assert_eq!(b.unit_of_work().pending_commands(), 0);
        a.unit_of_work().discard_changes();
    }

    #[tokio::test]
    async fn valuations_leave_rates_cached() {
        let core = Arc::new(core());
        let cancel = CancellationToken::new();
        core.seed(&cancel).await.unwrap();
        let ids: Vec<String> = core
            .portfolio_repository()
            .get_all()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id().to_string())
            .collect();

        let totals = futures::future::try_join_all(
            ids.iter().map(|id| core.get_total_value(id, Some("NOK"), &cancel)),
        )
        .await
        .unwrap();
        assert_eq!(totals.len(), 2);

        let cached = core.exchange_rates().get_rates(&cancel).await.unwrap();
        assert!(cached.is_some());
    }

    #[test]
    fn from_settings_requires_token() {
        let err = PortfolioServiceCore::from_settings(&ServiceSettings::default()).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn from_settings_opens_redb_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = ServiceSettings::default();
        settings.database.path = dir.path().join("svc.redb").display().to_string();
        settings.exchange_rate_api.token = "token".into();

        let core = PortfolioServiceCore::from_settings(&settings).unwrap();

        assert_eq!(core.store().name(), "redb");
        assert_eq!(core.portfolio_repository().collection_name(), "Portfolios");
    }
}
