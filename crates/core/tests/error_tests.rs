// ═══════════════════════════════════════════════════════════════════
// Error Tests — messages and classification
// ═══════════════════════════════════════════════════════════════════

use std::error::Error;

use portfolio_service_core::errors::CoreError;

mod display {
    use super::*;

    #[test]
    fn upstream_message_names_status_and_reason() {
        let err = CoreError::UpstreamUnavailable {
            status: Some(429),
            content: "rate limited".into(),
        };
        assert_eq!(
            err.to_string(),
            "Error occurred while retrieving exchange rate data. Status Code: 429. Reason: rate limited"
        );
    }

    #[test]
    fn upstream_message_without_http_answer() {
        let err = CoreError::UpstreamUnavailable {
            status: None,
            content: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "Error occurred while retrieving exchange rate data. Status Code: none. Reason: connection refused"
        );
    }

    #[test]
    fn overflow_message() {
        assert_eq!(
            CoreError::ValuationOverflow("total of portfolio x".into()).to_string(),
            "Valuation overflows: total of portfolio x"
        );
    }

    #[test]
    fn validation_and_lookup_messages() {
        assert_eq!(
            CoreError::Validation("Id is required!".into()).to_string(),
            "Validation failed: Id is required!"
        );
        assert_eq!(
            CoreError::PortfolioNotFound("abc".into()).to_string(),
            "Portfolio not found: abc"
        );
        assert_eq!(
            CoreError::MissingRate("USDSEK".into()).to_string(),
            "No exchange rate found for USDSEK"
        );
        assert_eq!(CoreError::Cancelled.to_string(), "Operation cancelled");
    }

    #[test]
    fn transaction_exposes_failing_command_as_source() {
        let err = CoreError::Transaction {
            commands: 3,
            source: Box::new(CoreError::DuplicateKey {
                collection: "Portfolios".into(),
                id: "x".into(),
            }),
        };
        assert_eq!(
            err.to_string(),
            "Unit of work with 3 commands was rolled back: Document x already exists in collection Portfolios"
        );
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "Document x already exists in collection Portfolios");
    }
}

mod classification {
    use super::*;

    #[test]
    fn validation_predicates() {
        assert!(CoreError::Validation("x".into()).is_validation());
        assert!(CoreError::InvalidPortfolioId("x".into()).is_validation());
        assert!(!CoreError::RatesUnavailable.is_validation());
    }

    #[test]
    fn not_found_predicate() {
        assert!(CoreError::PortfolioNotFound("x".into()).is_not_found());
        assert!(!CoreError::Validation("x".into()).is_not_found());
    }

    #[test]
    fn only_transient_upstream_failures_are_retryable() {
        let upstream = |status| CoreError::UpstreamUnavailable {
            status,
            content: String::new(),
        };
        assert!(upstream(None).is_retryable());
        assert!(upstream(Some(503)).is_retryable());
        assert!(upstream(Some(429)).is_retryable());
        assert!(!upstream(Some(401)).is_retryable());
        assert!(!CoreError::Storage("disk".into()).is_retryable());
        assert!(!CoreError::ValuationOverflow("x".into()).is_retryable());
    }

    #[test]
    fn conversions_pick_matching_variant() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(matches!(CoreError::from(io), CoreError::Storage(_)));

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(CoreError::from(json), CoreError::Deserialization(_)));
    }
}
