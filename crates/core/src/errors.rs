use thiserror::Error;

/// Unified error type for the entire portfolio-insights-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage / File ──────────────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No price history provider available: {0}")]
    NoProvider(String),

    // ── Analytics ───────────────────────────────────────────────────
    #[error("Insufficient price data: {0}")]
    InsufficientData(String),

    #[error("Cannot compute KPIs from an empty series")]
    EmptySeries,

    // ── Benchmarks ──────────────────────────────────────────────────
    #[error("Malformed benchmark '{name}': {reason}")]
    MalformedBenchmark { name: String, reason: String },

    #[error("Unknown benchmark: {0}")]
    UnknownBenchmark(String),

    // ── Allocation ──────────────────────────────────────────────────
    #[error("Total weight is {actual:.2}%. Ensure weights sum to 100%.")]
    WeightSum { actual: f64 },

    #[error("Allocation row not found: {0}")]
    RowNotFound(usize),

    #[error("Validation failed: {0}")]
    Validation(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<tempfile::PersistError> for CoreError {
    fn from(e: tempfile::PersistError) -> Self {
        CoreError::FileIO(e.error.to_string())
    }
}

impl From<csv::Error> for CoreError {
    fn from(e: csv::Error) -> Self {
        CoreError::Csv(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL, and the Alpha Vantage key travels
        // in the query string.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
