use serde::{Deserialize, Serialize};

use super::asset::CryptoAsset;

/// The crypto asset currently chosen in the selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCrypto {
    pub id: String,
    pub name: String,
}

impl From<&CryptoAsset> for SelectedCrypto {
    fn from(asset: &CryptoAsset) -> Self {
        Self {
            id: asset.id.clone(),
            name: asset.name.clone(),
        }
    }
}

/// Explicit "current selection" handed to every view-model operation.
///
/// `generation` increases on every change of entry or crypto, so responses
/// to fetches issued under an older selection can be recognized and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionContext {
    pub entry_id: String,
    pub crypto: Option<SelectedCrypto>,
    pub generation: u64,
}

impl SelectionContext {
    pub fn new(entry_id: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.into(),
            crypto: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn crypto_id(&self) -> Option<&str> {
        self.crypto.as_ref().map(|c| c.id.as_str())
    }

    #[must_use]
    pub fn crypto_name(&self) -> Option<&str> {
        self.crypto.as_ref().map(|c| c.name.as_str())
    }

    /// Replace the selected crypto (or clear it) and start a new generation.
    pub fn select(&mut self, crypto: Option<SelectedCrypto>) {
        self.crypto = crypto;
        self.generation += 1;
    }

    /// Snapshot of this selection for one transaction fetch.
    #[must_use]
    pub fn ticket(&self) -> FetchTicket {
        FetchTicket {
            entry_id: self.entry_id.clone(),
            crypto_id: self.crypto_id().map(str::to_string),
            generation: self.generation,
        }
    }

    #[must_use]
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation && ticket.entry_id == self.entry_id
    }
}

/// Selection captured when a transaction fetch was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub entry_id: String,
    pub crypto_id: Option<String>,
    pub generation: u64,
}
