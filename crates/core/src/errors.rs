use thiserror::Error;

/// Unified error type for the entire portfolio-service-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation ──────────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid portfolio id: {0}")]
    InvalidPortfolioId(String),

    // ── Not found ───────────────────────────────────────────────────
    #[error("Portfolio not found: {0}")]
    PortfolioNotFound(String),

    // ── Exchange rates ──────────────────────────────────────────────
    /// `status` is `None` when the request never got an HTTP answer.
    #[error(
        "Error occurred while retrieving exchange rate data. Status Code: {}. Reason: {content}",
        status_label(.status)
    )]
    UpstreamUnavailable { status: Option<u16>, content: String },

    #[error("Exchange rates are unavailable")]
    RatesUnavailable,

    #[error("No exchange rate found for {0}")]
    MissingRate(String),

    #[error("Invalid exchange rate for {pair}: {rate}")]
    InvalidRate { pair: String, rate: String },

    #[error("Valuation overflows: {0}")]
    ValuationOverflow(String),

    // ── Storage ─────────────────────────────────────────────────────
    #[error("Unit of work with {commands} commands was rolled back: {source}")]
    Transaction {
        commands: usize,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Document {id} already exists in collection {collection}")]
    DuplicateKey { collection: String, id: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Runtime ─────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl CoreError {
    /// Upstream failures that may clear up on their own: no HTTP answer at
    /// all, throttling, or a server-side error.
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::UpstreamUnavailable { status: None, .. } => true,
            CoreError::UpstreamUnavailable { status: Some(code), .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::PortfolioNotFound(_))
    }

    /// Malformed input rejected before any I/O happened.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_) | CoreError::InvalidPortfolioId(_)
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

/// reqwest errors carry the full URL, and the access key travels in the query.
pub(crate) fn redact_query(msg: String) -> String {
    match msg.find('?') {
        Some(idx) => format!("{}?<query redacted>", &msg[..idx]),
        None => msg,
    }
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |code| code.to_string())
}

/// The rate source is the only HTTP collaborator, so transport failures
/// surface as an unavailable upstream.
impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        CoreError::UpstreamUnavailable {
            status: e.status().map(|s| s.as_u16()),
            content: redact_query(e.to_string()),
        }
    }
}

impl From<redb::Error> for CoreError {
    fn from(e: redb::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<redb::DatabaseError> for CoreError {
    fn from(e: redb::DatabaseError) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<redb::TransactionError> for CoreError {
    fn from(e: redb::TransactionError) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<redb::TableError> for CoreError {
    fn from(e: redb::TableError) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<redb::StorageError> for CoreError {
    fn from(e: redb::StorageError) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<redb::CommitError> for CoreError {
    fn from(e: redb::CommitError) -> Self {
        CoreError::Storage(e.to_string())
    }
}
