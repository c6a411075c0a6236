use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::{redact_query, CoreError};
use crate::models::quote::Quote;
use crate::models::settings::ExchangeRateApiOptions;
use super::traits::ExchangeRateSource;

/// currencylayer.com live rates.
///
/// - **Endpoint**: `GET {base}/live?access_key={key}`
/// - **Pivot**: USD; quotes are keyed `USD` + currency code (e.g. `USDSEK`).
/// - **Errors**: reported in-band as `success: false` plus an `error` object,
///   in addition to ordinary HTTP failures.
pub struct CurrencyLayerClient {
    client: Client,
    base_url: String,
}

impl CurrencyLayerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_options(options: &ExchangeRateApiOptions) -> Self {
        Self::new(
            options.base_api_address.clone(),
            Duration::from_secs(options.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Interpret a raw `/live` response.
    ///
    /// - non-2xx status → `UpstreamUnavailable` carrying status and body
    /// - `success: false` → `UpstreamUnavailable` carrying the provider's error info
    /// - `null` body or no quotes → `Ok(None)`
    ///
    /// Rates are read from their JSON text, never through `f64`.
    pub fn parse_response(status: u16, body: &str) -> Result<Option<Quote>, CoreError> {
        if !(200..300).contains(&status) {
            return Err(CoreError::UpstreamUnavailable {
                status: Some(status),
                content: body.to_string(),
            });
        }

        let envelope: Option<LiveResponse> =
            serde_json::from_str(body).map_err(|e| unreadable(status, e))?;

        let Some(envelope) = envelope else {
            return Ok(None);
        };

        if !envelope.success {
            let content = envelope
                .error
                .map(|e| format!("{} ({})", e.info, e.code))
                .unwrap_or_else(|| "request was not successful".to_string());
            return Err(CoreError::UpstreamUnavailable {
                status: Some(status),
                content,
            });
        }

        if envelope.quotes.is_empty() {
            return Ok(None);
        }

        let mut quotes = HashMap::with_capacity(envelope.quotes.len());
        for (pair, raw) in envelope.quotes {
            let rate = parse_rate(raw.get()).ok_or_else(|| CoreError::UpstreamUnavailable {
                status: Some(status),
                content: format!("Unreadable rate for {pair}: {}", raw.get()),
            })?;
            quotes.insert(pair, rate);
        }

        Ok(Some(Quote {
            success: true,
            terms: envelope.terms,
            privacy: envelope.privacy,
            timestamp: envelope.timestamp,
            source: envelope.source,
            quotes,
        }))
    }
}

fn unreadable(status: u16, e: serde_json::Error) -> CoreError {
    CoreError::UpstreamUnavailable {
        status: Some(status),
        content: format!("Unreadable exchange rate payload: {e}"),
    }
}

/// Exact decimal from a JSON number (or quoted number) as written on the wire.
fn parse_rate(text: &str) -> Option<Decimal> {
    let text = text.trim().trim_matches('"');
    Decimal::from_str_exact(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

// ── currencylayer response types ────────────────────────────────────

#[derive(Deserialize)]
struct LiveResponse {
    success: bool,
    #[serde(default)]
    terms: String,
    #[serde(default)]
    privacy: String,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    source: String,
    #[serde(default)]
    quotes: HashMap<String, Box<RawValue>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    info: String,
}

#[async_trait]
impl ExchangeRateSource for CurrencyLayerClient {
    fn name(&self) -> &str {
        "currencylayer"
    }

    async fn fetch_quotes(&self, access_key: &str) -> Result<Option<Quote>, CoreError> {
        let url = format!("{}/live", self.base_url);

        // Transport failures convert into `UpstreamUnavailable` with no status.
        let resp = self
            .client
            .get(&url)
            .query(&[("access_key", access_key)])
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| CoreError::UpstreamUnavailable {
            status: Some(status),
            content: redact_query(e.to_string()),
        })?;
        Self::parse_response(status, &body)
    }
}
