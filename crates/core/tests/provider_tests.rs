// ═══════════════════════════════════════════════════════════════════
// Provider Tests — currencylayer response handling, synthetic prices
// ═══════════════════════════════════════════════════════════════════

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

use portfolio_service_core::errors::CoreError;
use portfolio_service_core::models::settings::ExchangeRateApiOptions;
use portfolio_service_core::providers::currencylayer::CurrencyLayerClient;
use portfolio_service_core::providers::synthetic::SyntheticStockPriceProvider;
use portfolio_service_core::providers::traits::{ExchangeRateSource, StockPriceProvider};

// ═══════════════════════════════════════════════════════════════════
// currencylayer
// ═══════════════════════════════════════════════════════════════════

mod currencylayer {
    use super::*;

    const LIVE_OK: &str = r#"{
        "success": true,
        "terms": "https://currencylayer.com/terms",
        "privacy": "https://currencylayer.com/privacy",
        "timestamp": 1432400348,
        "source": "USD",
        "quotes": { "USDSEK": 10.25, "USDNOK": 9.5, "USDCAD": 1.35 }
    }"#;

    #[test]
    fn parses_successful_live_response() {
        let quote = CurrencyLayerClient::parse_response(200, LIVE_OK).unwrap().unwrap();
        assert!(quote.success);
        assert_eq!(quote.source, "USD");
        assert_eq!(quote.timestamp, 1432400348);
        assert_eq!(quote.rate_per_usd("SEK"), Some(dec!(10.25)));
        assert_eq!(quote.rate_per_usd("CAD"), Some(dec!(1.35)));
        assert_eq!(quote.quotes.len(), 3);
    }

    #[test]
    fn rates_are_read_without_float_rounding() {
        let body = r#"{
            "success": true,
            "source": "USD",
            "quotes": { "USDSEK": 10.123456789012345678901, "USDJPY": 1.5e2, "USDNOK": "9.75" }
        }"#;
        let quote = CurrencyLayerClient::parse_response(200, body).unwrap().unwrap();
        assert_eq!(
            quote.rate_per_usd("SEK").unwrap().to_string(),
            "10.123456789012345678901"
        );
        assert_eq!(quote.rate_per_usd("JPY"), Some(dec!(150)));
        assert_eq!(quote.rate_per_usd("NOK"), Some(dec!(9.75)));
    }

    #[test]
    fn non_numeric_rate_is_upstream_unavailable() {
        let body = r#"{ "success": true, "quotes": { "USDSEK": true } }"#;
        let err = CurrencyLayerClient::parse_response(200, body).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UpstreamUnavailable { status: Some(200), ref content } if content.contains("USDSEK")
        ));
    }

    #[test]
    fn non_success_status_carries_status_and_body() {
        let err = CurrencyLayerClient::parse_response(503, "Service Unavailable").unwrap_err();
        match err {
            CoreError::UpstreamUnavailable { status, content } => {
                assert_eq!(status, Some(503));
                assert_eq!(content, "Service Unavailable");
            }
            other => panic!("expected UpstreamUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn in_band_error_is_upstream_unavailable() {
        let body = r#"{
            "success": false,
            "error": { "code": 101, "info": "You have not supplied a valid API Access Key." }
        }"#;
        let err = CurrencyLayerClient::parse_response(200, body).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UpstreamUnavailable { status: Some(200), ref content }
                if content == "You have not supplied a valid API Access Key. (101)"
        ));
    }

    #[test]
    fn in_band_error_without_details() {
        let err = CurrencyLayerClient::parse_response(200, r#"{ "success": false }"#).unwrap_err();
        assert!(matches!(
            err,
            CoreError::UpstreamUnavailable { ref content, .. } if content == "request was not successful"
        ));
    }

    #[test]
    fn null_body_is_no_rates() {
        assert!(CurrencyLayerClient::parse_response(200, "null").unwrap().is_none());
    }

    #[test]
    fn empty_quotes_are_no_rates() {
        let body = r#"{ "success": true, "source": "USD", "quotes": {} }"#;
        assert!(CurrencyLayerClient::parse_response(200, body).unwrap().is_none());
    }

    #[test]
    fn unreadable_body_is_upstream_unavailable() {
        let err = CurrencyLayerClient::parse_response(200, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, CoreError::UpstreamUnavailable { status: Some(200), .. }));
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = CurrencyLayerClient::new("http://api.currencylayer.com/", Duration::from_secs(5));
        assert_eq!(client.base_url(), "http://api.currencylayer.com");
        assert_eq!(client.name(), "currencylayer");
    }

    #[test]
    fn built_from_options() {
        let options = ExchangeRateApiOptions {
            base_api_address: "http://localhost:9999".into(),
            ..Default::default()
        };
        let client = CurrencyLayerClient::from_options(&options);
        assert_eq!(client.base_url(), "http://localhost:9999");
    }

    #[tokio::test]
    async fn unreachable_host_is_upstream_unavailable_without_key() {
        // port 9 (discard) on localhost is expected to refuse connections
        let client = CurrencyLayerClient::new("http://127.0.0.1:9", Duration::from_secs(2));
        let err = client.fetch_quotes("super-secret").await.unwrap_err();
        match &err {
            CoreError::UpstreamUnavailable { status, content } => {
                assert_eq!(*status, None);
                assert!(!content.contains("super-secret"));
            }
            other => panic!("expected UpstreamUnavailable, got {other:?}"),
        }
        assert!(err.is_retryable());
        assert!(!err.to_string().contains("super-secret"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Synthetic prices
// ═══════════════════════════════════════════════════════════════════

mod synthetic {
    use super::*;

    #[tokio::test]
    async fn prices_stay_in_range() {
        let provider = SyntheticStockPriceProvider::new();
        for _ in 0..200 {
            let price = provider.current_price("TSLA").await.unwrap();
            assert!(price.price >= Decimal::from(20));
            assert!(price.price < Decimal::from(800));
            assert!(["USD", "SEK", "NOK", "CAD", "EUR"].contains(&price.base_currency.as_str()));
        }
    }

    #[tokio::test]
    async fn empty_ticker_is_rejected() {
        let provider = SyntheticStockPriceProvider::new();
        let err = provider.current_price(" ").await.unwrap_err();
        assert!(err.is_validation());
    }
}
