pub mod errors;
pub mod models;
pub mod services;
pub mod storage;
pub mod transport;

use std::collections::HashMap;

use errors::CoreError;
use models::{
    analytics::PortfolioSummary,
    asset::CryptoAsset,
    message::{ClientMessage, ServerMessage},
    selection::{FetchTicket, SelectedCrypto, SelectionContext},
    settings::{CardConfig, ClientSettings},
    snapshot::DatabaseSnapshot,
    transaction::{Transaction, TransactionDraft},
};
use services::{
    analytics_service::AnalyticsService, api_service::PortfolioApi,
    transaction_service::TransactionService,
};

pub const CONFIRM_DELETE_TRANSACTION: &str = "Are you sure you want to delete this transaction?";
pub const CONFIRM_DELETE_CRYPTO: &str = "Are you sure you want to delete this crypto?";

/// Blocking yes/no gate shown before a destructive call.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of an operation guarded by a `Confirm` gate.
#[derive(Debug)]
pub enum Confirmed<T> {
    /// The user said no; nothing was sent.
    Declined,
    Done(T),
}

impl<T> Confirmed<T> {
    #[must_use]
    pub fn is_declined(&self) -> bool {
        matches!(self, Confirmed::Declined)
    }

    pub fn done(self) -> Option<T> {
        match self {
            Confirmed::Declined => None,
            Confirmed::Done(v) => Some(v),
        }
    }
}

/// A backend mutation that succeeded, plus the reload that followed it.
///
/// The reload failing does not undo the mutation; it only leaves the view empty.
#[derive(Debug)]
pub struct MutationReport<T = Vec<Transaction>> {
    /// Success text for the user notification
    pub notice: String,
    pub refreshed: Result<T, CoreError>,
}

/// Outcome of loading the asset list of an entry.
#[derive(Debug)]
pub struct AssetsLoaded {
    pub assets: Vec<CryptoAsset>,
    /// Transactions of the auto-selected first asset; `None` when the entry has no assets.
    pub transactions: Option<Result<Vec<Transaction>, CoreError>>,
}

/// Client-side view-model of the transactions panel/card.
///
/// Holds the current selection, the last unfiltered transaction list the
/// backend returned, and mediates every create/update/delete. After each
/// mutation the list is refetched in full; nothing is patched locally.
#[must_use]
pub struct TransactionViewModel {
    api: PortfolioApi,
    context: SelectionContext,
    assets: Vec<CryptoAsset>,
    last_fetched: Vec<Transaction>,
    loaded: bool,
    transaction_service: TransactionService,
    analytics_service: AnalyticsService,
}

impl std::fmt::Debug for TransactionViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionViewModel")
            .field("transport", &self.api.transport_name())
            .field("context", &self.context)
            .field("assets", &self.assets.len())
            .field("fetched", &self.last_fetched.len())
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl TransactionViewModel {
    /// View-model for one entry, nothing selected yet.
    pub fn new(api: PortfolioApi, entry_id: impl Into<String>) -> Self {
        Self {
            api,
            context: SelectionContext::new(entry_id),
            assets: Vec::new(),
            last_fetched: Vec::new(),
            loaded: false,
            transaction_service: TransactionService::new(),
            analytics_service: AnalyticsService::new(),
        }
    }

    /// View-model from host configuration; a preset `crypto_id` becomes the selection.
    pub fn from_config(api: PortfolioApi, config: &CardConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let mut vm = Self::new(api, config.entry_id.clone());
        if let Some(id) = config.crypto_id.as_deref().filter(|id| !id.is_empty()) {
            let name = config.crypto_name.clone().unwrap_or_else(|| id.to_string());
            vm.select(id, name);
        }
        Ok(vm)
    }

    /// Connect a transport from settings and build the view-model.
    pub fn connect(settings: &ClientSettings, config: &CardConfig) -> Result<Self, CoreError> {
        let transport = transport::connect(settings)?;
        Self::from_config(PortfolioApi::new(transport), config)
    }

    // ── State ───────────────────────────────────────────────────────

    pub fn api(&self) -> &PortfolioApi {
        &self.api
    }

    pub fn context(&self) -> &SelectionContext {
        &self.context
    }

    #[must_use]
    pub fn entry_id(&self) -> &str {
        &self.context.entry_id
    }

    #[must_use]
    pub fn selected_crypto(&self) -> Option<&SelectedCrypto> {
        self.context.crypto.as_ref()
    }

    #[must_use]
    pub fn assets(&self) -> &[CryptoAsset] {
        &self.assets
    }

    /// The unfiltered list as last returned by the backend.
    #[must_use]
    pub fn last_fetched(&self) -> &[Transaction] {
        &self.last_fetched
    }

    /// Whether the last transaction fetch for this selection succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Rows to display: the fetched list filtered to the selected crypto.
    #[must_use]
    pub fn visible_transactions(&self) -> Vec<Transaction> {
        self.transaction_service
            .visible(&self.last_fetched, self.context.crypto_id())
    }

    /// A displayed row, e.g. to prefill the edit form.
    pub fn transaction_for_edit(&self, transaction_id: &str) -> Result<Transaction, CoreError> {
        let crypto_id = self.context.crypto_id().ok_or(CoreError::NoCryptoSelected)?;
        let visible = self
            .transaction_service
            .filter_by_crypto(&self.last_fetched, crypto_id);
        self.transaction_service
            .find(&visible, transaction_id)
            .cloned()
    }

    /// Profit/loss over every fetched transaction of the entry.
    pub fn summary(&self, current_prices: &HashMap<String, f64>) -> PortfolioSummary {
        self.analytics_service
            .summarize(&self.last_fetched, current_prices)
    }

    // ── Selection ───────────────────────────────────────────────────

    /// Change the selected crypto without touching the backend or the fetched list.
    /// Returns the ticket for the reload that should follow.
    pub fn select(&mut self, crypto_id: &str, crypto_name: impl Into<String>) -> FetchTicket {
        self.context.select(Some(SelectedCrypto {
            id: crypto_id.to_string(),
            name: crypto_name.into(),
        }));
        self.context.ticket()
    }

    /// Select a crypto and reload its transactions.
    pub async fn select_crypto(
        &mut self,
        crypto_id: &str,
        crypto_name: impl Into<String>,
    ) -> Result<Vec<Transaction>, CoreError> {
        self.select(crypto_id, crypto_name);
        self.load_transactions().await
    }

    fn switch_entry(&mut self, entry_id: &str) {
        if self.context.entry_id == entry_id {
            return;
        }
        let generation = self.context.generation + 1;
        self.context = SelectionContext::new(entry_id);
        self.context.generation = generation;
        self.assets.clear();
        self.last_fetched.clear();
        self.loaded = false;
    }

    // ── Loading ─────────────────────────────────────────────────────

    /// Fetch the entry's assets; the first one becomes the selection and its
    /// transactions are loaded. An empty list leaves nothing selected.
    pub async fn load_crypto_assets(&mut self, entry_id: &str) -> Result<AssetsLoaded, CoreError> {
        if entry_id.trim().is_empty() {
            return Err(CoreError::ValidationError("entry_id must not be empty".into()));
        }
        self.switch_entry(entry_id);

        let assets = match self.api.load_cryptos(entry_id).await {
            Ok(assets) => assets,
            Err(e) => {
                tracing::error!("failed to load cryptos for entry {entry_id}: {e}");
                return Err(e);
            }
        };
        Ok(self.apply_assets(assets).await)
    }

    async fn apply_assets(&mut self, assets: Vec<CryptoAsset>) -> AssetsLoaded {
        tracing::debug!(
            "entry {} has {} crypto assets",
            self.context.entry_id,
            assets.len()
        );
        self.assets = assets;
        let first = self.assets.first().map(SelectedCrypto::from);
        match first {
            Some(crypto) => {
                self.context.select(Some(crypto));
                let transactions = self.load_transactions().await;
                AssetsLoaded {
                    assets: self.assets.clone(),
                    transactions: Some(transactions),
                }
            }
            None => {
                self.context.select(None);
                self.loaded = false;
                AssetsLoaded {
                    assets: Vec::new(),
                    transactions: None,
                }
            }
        }
    }

    /// Snapshot the selection before issuing a transaction fetch.
    pub fn begin_load(&self) -> FetchTicket {
        self.context.ticket()
    }

    /// Apply a fetch result issued under `ticket`.
    ///
    /// Results for a selection that has since changed are discarded with
    /// `StaleResponse` and leave the state untouched. A failed fetch empties
    /// the view and is returned to the caller.
    pub fn apply_load(
        &mut self,
        ticket: &FetchTicket,
        fetched: Result<Vec<Transaction>, CoreError>,
    ) -> Result<Vec<Transaction>, CoreError> {
        if !self.context.is_current(ticket) {
            tracing::debug!(
                "discarding transactions fetched under generation {} (current {})",
                ticket.generation,
                self.context.generation
            );
            return Err(CoreError::StaleResponse {
                generation: ticket.generation,
                current: self.context.generation,
            });
        }

        match fetched {
            Ok(all) => {
                self.last_fetched = all;
                self.loaded = true;
                Ok(self.visible_transactions())
            }
            Err(e) => {
                tracing::warn!(
                    "failed to load transactions for entry {}: {e}",
                    ticket.entry_id
                );
                self.last_fetched.clear();
                self.loaded = false;
                Err(e)
            }
        }
    }

    /// Fetch the entry's full list and return the rows of the selected crypto.
    pub async fn load_transactions(&mut self) -> Result<Vec<Transaction>, CoreError> {
        let ticket = self.begin_load();
        let fetched = self.api.list_transactions(&ticket.entry_id).await;
        self.apply_load(&ticket, fetched)
    }

    // ── Socket variant ──────────────────────────────────────────────

    /// Request asking the socket backend for this entry's assets.
    pub fn fetch_cryptos_message(&self) -> ClientMessage {
        ClientMessage::FetchCryptos {
            entry_id: self.context.entry_id.clone(),
        }
    }

    /// Apply a message pushed over the socket.
    pub async fn handle_server_message(&mut self, text: &str) -> Result<AssetsLoaded, CoreError> {
        match ServerMessage::from_json(text)? {
            ServerMessage::CryptosResponse { cryptos } => Ok(self.apply_assets(cryptos).await),
        }
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Create a transaction under the current entry, then reload.
    pub async fn create_transaction(
        &mut self,
        draft: &TransactionDraft,
    ) -> Result<MutationReport, CoreError> {
        let entry_id = self.context.entry_id.clone();
        if let Err(e) = self.api.create_transaction(&entry_id, draft).await {
            tracing::error!("failed to add transaction: {e}");
            return Err(e);
        }
        tracing::info!(
            "transaction added to entry {entry_id}: {} {}",
            draft.transaction_type,
            draft.crypto_name
        );
        Ok(MutationReport {
            notice: "Transaction added".to_string(),
            refreshed: self.load_transactions().await,
        })
    }

    /// Replace the fields of an existing transaction, then reload.
    pub async fn update_transaction(
        &mut self,
        transaction_id: &str,
        draft: &TransactionDraft,
    ) -> Result<MutationReport, CoreError> {
        let entry_id = self.context.entry_id.clone();
        if let Err(e) = self.api.update_transaction(&entry_id, transaction_id, draft).await {
            tracing::error!("failed to update transaction {transaction_id}: {e}");
            return Err(e);
        }
        tracing::info!("transaction {transaction_id} updated in entry {entry_id}");
        Ok(MutationReport {
            notice: "Transaction updated".to_string(),
            refreshed: self.load_transactions().await,
        })
    }

    /// Delete a transaction once the gate confirms, then reload.
    pub async fn delete_transaction<C: Confirm + ?Sized>(
        &mut self,
        transaction_id: &str,
        confirm: &C,
    ) -> Result<Confirmed<MutationReport>, CoreError> {
        if !confirm.confirm(CONFIRM_DELETE_TRANSACTION) {
            return Ok(Confirmed::Declined);
        }
        let entry_id = self.context.entry_id.clone();
        if let Err(e) = self.api.delete_transaction(&entry_id, transaction_id).await {
            tracing::error!("failed to delete transaction {transaction_id}: {e}");
            return Err(e);
        }
        tracing::info!("transaction {transaction_id} deleted from entry {entry_id}");
        Ok(Confirmed::Done(MutationReport {
            notice: "Transaction deleted".to_string(),
            refreshed: self.load_transactions().await,
        }))
    }

    /// Register a new asset under the current entry, then reload the asset list.
    pub async fn add_crypto_asset(
        &mut self,
        asset: &CryptoAsset,
    ) -> Result<MutationReport<AssetsLoaded>, CoreError> {
        let entry_id = self.context.entry_id.clone();
        if let Err(e) = self.api.save_crypto(&entry_id, asset).await {
            tracing::error!("failed to save crypto {}: {e}", asset.id);
            return Err(e);
        }
        tracing::info!("crypto {} saved in entry {entry_id}", asset.id);
        Ok(MutationReport {
            notice: "Crypto saved".to_string(),
            refreshed: self.load_crypto_assets(&entry_id).await,
        })
    }

    /// Delete an asset once the gate confirms, then reload the asset list.
    ///
    /// Whether its transactions go with it is up to the backend.
    pub async fn delete_crypto_asset<C: Confirm + ?Sized>(
        &mut self,
        crypto_id: &str,
        confirm: &C,
    ) -> Result<Confirmed<MutationReport<AssetsLoaded>>, CoreError> {
        if !confirm.confirm(CONFIRM_DELETE_CRYPTO) {
            return Ok(Confirmed::Declined);
        }
        let entry_id = self.context.entry_id.clone();
        if let Err(e) = self.api.delete_crypto(&entry_id, crypto_id).await {
            tracing::error!("failed to delete crypto {crypto_id}: {e}");
            return Err(e);
        }
        tracing::info!("crypto {crypto_id} deleted from entry {entry_id}");
        Ok(Confirmed::Done(MutationReport {
            notice: "Crypto deleted".to_string(),
            refreshed: self.load_crypto_assets(&entry_id).await,
        }))
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Download the entry's database snapshot.
    pub async fn export_database(&self) -> Result<DatabaseSnapshot, CoreError> {
        let snapshot = self.api.export_db(&self.context.entry_id).await.map_err(|e| {
            tracing::error!("failed to export database: {e}");
            e
        })?;
        tracing::info!("exported {} bytes for entry {}", snapshot.len(), snapshot.entry_id);
        Ok(snapshot)
    }

    /// Upload a snapshot into the current entry, then reload the asset list.
    pub async fn import_database(
        &mut self,
        snapshot: &DatabaseSnapshot,
    ) -> Result<MutationReport<AssetsLoaded>, CoreError> {
        let entry_id = self.context.entry_id.clone();
        if let Err(e) = self.api.import_db(&entry_id, snapshot).await {
            tracing::error!("failed to import database: {e}");
            return Err(e);
        }
        tracing::info!("imported {} into entry {entry_id}", snapshot.file_name);
        Ok(MutationReport {
            notice: "Database imported".to_string(),
            refreshed: self.load_crypto_assets(&entry_id).await,
        })
    }
}
