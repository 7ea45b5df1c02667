use thiserror::Error;

/// Unified error type for the entire portfolio-crypto-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Backend / Network ───────────────────────────────────────────
    /// Non-2xx status (with the backend's raw text) or a transport failure (no status).
    #[error("Fetch failed ({}): {message}", status_label(.status))]
    FetchFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("Transport does not support this operation: {0}")]
    Unsupported(String),

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Input / Configuration ───────────────────────────────────────
    #[error("Form validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── View state ──────────────────────────────────────────────────
    #[error("No crypto asset selected")]
    NoCryptoSelected,

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Stale response discarded (generation {generation}, current {current})")]
    StaleResponse {
        generation: u64,
        current: u64,
    },
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => "transport".to_string(),
    }
}

impl CoreError {
    /// HTTP status carried by a `FetchFailed`, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            CoreError::FetchFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// True when the backend reported the target as unknown.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, CoreError::StaleResponse { .. })
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Strip query parameters from URLs: ingress and bridge URLs can carry tokens.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::FetchFailed {
            status: e.status().map(|s| s.as_u16()),
            message: sanitized,
        }
    }
}
