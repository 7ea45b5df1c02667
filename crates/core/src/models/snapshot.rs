use serde::{Deserialize, Serialize};

/// An exported backend database, kept as an opaque blob.
///
/// The client never parses `bytes`; it only moves them between the
/// backend, the user's disk, and back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub entry_id: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DatabaseSnapshot {
    pub fn new(entry_id: impl Into<String>, bytes: Vec<u8>) -> Self {
        let entry_id = entry_id.into();
        Self {
            file_name: Self::default_file_name(&entry_id),
            entry_id,
            bytes,
        }
    }

    /// "portfolio_crypto_{entry_id}.db"
    #[must_use]
    pub fn default_file_name(entry_id: &str) -> String {
        format!("portfolio_crypto_{entry_id}.db")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
