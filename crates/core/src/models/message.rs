use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::asset::{assets_from_wire, CryptoAsset};
use crate::errors::CoreError;

/// Requests sent over the panel's WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    FetchCryptos { entry_id: String },
}

/// Messages pushed by the backend over the panel's WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    CryptosResponse {
        #[serde(default, deserialize_with = "normalized_assets")]
        cryptos: Vec<CryptoAsset>,
    },
}

/// Same shapes as `load_cryptos`: records or legacy `[name, id]` pairs.
fn normalized_assets<'de, D>(deserializer: D) -> Result<Vec<CryptoAsset>, D::Error>
where
    D: Deserializer<'de>,
{
    let payload = Value::deserialize(deserializer)?;
    assets_from_wire(payload).map_err(serde::de::Error::custom)
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to encode message: {e}")))
    }
}

impl ServerMessage {
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        serde_json::from_str(text)
            .map_err(|e| CoreError::InvalidResponse(format!("unrecognized socket message: {e}")))
    }
}
