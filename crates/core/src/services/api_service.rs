use serde_json::json;
use std::sync::Arc;
use urlencoding::encode;

use crate::errors::CoreError;
use crate::models::asset::{assets_from_wire, CryptoAsset};
use crate::models::snapshot::DatabaseSnapshot;
use crate::models::transaction::{transactions_from_wire, Transaction, TransactionDraft};
use crate::transport::traits::{BackendTransport, FormUpload, HostingMode};

/// Typed endpoints of the portfolio backend over any `BackendTransport`.
///
/// Responses are normalized here, on receipt, so nothing above this layer
/// ever sees positional rows or integer ids.
#[derive(Clone)]
pub struct PortfolioApi {
    transport: Arc<dyn BackendTransport>,
}

impl PortfolioApi {
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self { transport }
    }

    #[must_use]
    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// `GET transactions/{entry_id}`: the full, unfiltered list.
    pub async fn list_transactions(&self, entry_id: &str) -> Result<Vec<Transaction>, CoreError> {
        let payload = self.transport.get(&route(&["transactions", entry_id])).await?;
        transactions_from_wire(payload, entry_id)
    }

    /// `GET load_cryptos/{entry_id}`, in backend order.
    pub async fn load_cryptos(&self, entry_id: &str) -> Result<Vec<CryptoAsset>, CoreError> {
        let payload = self.transport.get(&route(&["load_cryptos", entry_id])).await?;
        assets_from_wire(payload)
    }

    /// `POST save_crypto`: register an asset under an entry.
    pub async fn save_crypto(&self, entry_id: &str, asset: &CryptoAsset) -> Result<(), CoreError> {
        let body = json!({
            "entry_id": entry_id,
            "crypto_name": asset.name,
            "crypto_id": asset.id,
        });
        self.transport.post("save_crypto", &body).await?;
        Ok(())
    }

    /// `POST transaction/{entry_id}`.
    pub async fn create_transaction(
        &self,
        entry_id: &str,
        draft: &TransactionDraft,
    ) -> Result<(), CoreError> {
        self.transport
            .post(
                &route(&["transaction", entry_id]),
                &draft.to_create_body(entry_id),
            )
            .await?;
        Ok(())
    }

    /// `PUT transaction/{entry_id}/{transaction_id}`.
    pub async fn update_transaction(
        &self,
        entry_id: &str,
        transaction_id: &str,
        draft: &TransactionDraft,
    ) -> Result<(), CoreError> {
        self.transport
            .put(
                &route(&["transaction", entry_id, transaction_id]),
                &draft.to_update_body(),
            )
            .await?;
        Ok(())
    }

    /// `DELETE transaction/{entry_id}/{transaction_id}`.
    pub async fn delete_transaction(
        &self,
        entry_id: &str,
        transaction_id: &str,
    ) -> Result<(), CoreError> {
        self.transport
            .delete(&route(&["transaction", entry_id, transaction_id]))
            .await
    }

    /// Delete an asset: a `delete_crypto` service call when embedded in the
    /// host, `DELETE crypto/{crypto_id}` when standalone.
    pub async fn delete_crypto(&self, entry_id: &str, crypto_id: &str) -> Result<(), CoreError> {
        match self.transport.hosting_mode() {
            HostingMode::Embedded => {
                let data = json!({ "crypto_id": crypto_id, "entry_id": entry_id });
                self.transport.call_service("delete_crypto", &data).await
            }
            HostingMode::Standalone => self.transport.delete(&route(&["crypto", crypto_id])).await,
        }
    }

    /// `GET export_db/{entry_id}` as an opaque blob.
    pub async fn export_db(&self, entry_id: &str) -> Result<DatabaseSnapshot, CoreError> {
        let bytes = self.transport.get_blob(&route(&["export_db", entry_id])).await?;
        Ok(DatabaseSnapshot::new(entry_id, bytes))
    }

    /// `POST import_db` as multipart with `file` and `entry_id`.
    pub async fn import_db(
        &self,
        entry_id: &str,
        snapshot: &DatabaseSnapshot,
    ) -> Result<(), CoreError> {
        let form = FormUpload {
            fields: vec![("entry_id".to_string(), entry_id.to_string())],
            file_field: "file".to_string(),
            file_name: snapshot.file_name.clone(),
            bytes: snapshot.bytes.clone(),
        };
        self.transport.post_form("import_db", form).await
    }
}

/// Relative backend path with every segment percent-encoded, so an id
/// containing `/`, `?` or `#` stays a single segment.
fn route(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
