use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CoreError;

/// A crypto asset tracked within a portfolio entry.
///
/// `id` is the backend's identifier (e.g. "bitcoin", "matic-network"),
/// `name` is the display name (e.g. "Bitcoin").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CryptoAsset {
    pub id: String,
    pub name: String,
}

impl CryptoAsset {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Label shown in the asset selector: "Bitcoin - bitcoin".
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} - {}", self.name, self.id)
    }
}

impl std::fmt::Display for CryptoAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ── Wire shapes ─────────────────────────────────────────────────────

/// Shapes `load_cryptos` has been observed to return.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireCrypto {
    Record { id: Value, name: String },
    /// Legacy positional pair: `[name, id]`.
    Pair(String, Value),
}

/// Normalize a `load_cryptos` payload into assets, preserving backend order.
pub fn assets_from_wire(payload: Value) -> Result<Vec<CryptoAsset>, CoreError> {
    if payload.is_null() {
        return Ok(Vec::new());
    }
    let rows: Vec<WireCrypto> = serde_json::from_value(payload).map_err(|e| {
        CoreError::InvalidResponse(format!("unrecognized crypto list: {e}"))
    })?;

    rows.into_iter()
        .map(|row| match row {
            WireCrypto::Record { id, name } => Ok(CryptoAsset::new(id_to_string(&id)?, name)),
            WireCrypto::Pair(name, id) => Ok(CryptoAsset::new(id_to_string(&id)?, name)),
        })
        .collect()
}

/// Backend ids are strings in some variants and SQLite integers in others.
pub(crate) fn id_to_string(value: &Value) -> Result<String, CoreError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(CoreError::InvalidResponse(format!(
            "expected string or integer id, got {other}"
        ))),
    }
}
