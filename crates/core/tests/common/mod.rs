// ═══════════════════════════════════════════════════════════════════
// Mock Backend — in-memory implementation of the backend contract
// ═══════════════════════════════════════════════════════════════════

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use portfolio_crypto_core::errors::CoreError;
use portfolio_crypto_core::models::asset::CryptoAsset;
use portfolio_crypto_core::models::transaction::{Transaction, TransactionType};
use portfolio_crypto_core::services::api_service::PortfolioApi;
use portfolio_crypto_core::transport::traits::{BackendTransport, FormUpload, HostingMode};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryData {
    pub cryptos: Vec<CryptoAsset>,
    pub transactions: Vec<Transaction>,
}

#[derive(Default)]
struct MockState {
    entries: HashMap<String, EntryData>,
    next_id: u64,
    requests: Vec<String>,
    failures: Vec<(String, u16, String)>,
    positional_rows: bool,
    legacy_cryptos: bool,
}

/// Behaves like the add-on backend: assigns ids, resolves `crypto_id`
/// from `crypto_name`, cascades asset deletion to its transactions.
pub struct MockBackend {
    mode: HostingMode,
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            mode: HostingMode::Standalone,
            state: Mutex::new(MockState {
                next_id: 100,
                ..MockState::default()
            }),
        }
    }

    pub fn embedded() -> Self {
        Self {
            mode: HostingMode::Embedded,
            ..Self::new()
        }
    }

    pub fn with_entry(self, entry_id: &str, cryptos: Vec<CryptoAsset>, transactions: Vec<Transaction>) -> Self {
        self.lock().entries.insert(
            entry_id.to_string(),
            EntryData {
                cryptos,
                transactions,
            },
        );
        self
    }

    /// Answer rows as positional arrays with integer ids (SQLite tuples).
    pub fn with_positional_rows(self) -> Self {
        self.lock().positional_rows = true;
        self
    }

    /// Answer `load_cryptos` as `[name, id]` pairs.
    pub fn with_legacy_cryptos(self) -> Self {
        self.lock().legacy_cryptos = true;
        self
    }

    /// Fail every request whose "METHOD path" starts with `prefix`.
    pub fn fail(&self, prefix: &str, status: u16, message: &str) {
        self.lock()
            .failures
            .push((prefix.to_string(), status, message.to_string()));
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    pub fn transactions(&self, entry_id: &str) -> Vec<Transaction> {
        self.lock()
            .entries
            .get(entry_id)
            .map(|e| e.transactions.clone())
            .unwrap_or_default()
    }

    pub fn cryptos(&self, entry_id: &str) -> Vec<CryptoAsset> {
        self.lock()
            .entries
            .get(entry_id)
            .map(|e| e.cryptos.clone())
            .unwrap_or_default()
    }

    /// Replace an entry's data behind the client's back.
    pub fn set_transactions(&self, entry_id: &str, transactions: Vec<Transaction>) {
        self.lock()
            .entries
            .entry(entry_id.to_string())
            .or_default()
            .transactions = transactions;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, method: &str, path: &str) -> Result<(), CoreError> {
        let line = format!("{method} {path}");
        let mut state = self.lock();
        state.requests.push(line.clone());
        if let Some((_, status, message)) = state
            .failures
            .iter()
            .find(|(prefix, _, _)| line.starts_with(prefix.as_str()))
        {
            return Err(fetch_failed(*status, message));
        }
        Ok(())
    }
}

pub fn shared(backend: MockBackend) -> (Arc<MockBackend>, PortfolioApi) {
    let backend = Arc::new(backend);
    let api = PortfolioApi::new(backend.clone());
    (backend, api)
}

fn fetch_failed(status: u16, message: &str) -> CoreError {
    CoreError::FetchFailed {
        status: Some(status),
        message: message.to_string(),
    }
}

fn not_found(message: &str) -> CoreError {
    fetch_failed(404, message)
}

/// Path segments, percent-decoded the way a web framework routes them.
fn segments(path: &str) -> Vec<String> {
    path.trim_matches('/')
        .split('/')
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| segment.to_string())
        })
        .collect()
}

fn resolve_crypto_id(data: &EntryData, crypto_name: &str) -> Option<String> {
    data.cryptos
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(crypto_name))
        .map(|c| c.id.clone())
}

struct Submitted {
    crypto_name: String,
    quantity: f64,
    price_usd: f64,
    transaction_type: TransactionType,
    location: String,
    date: NaiveDate,
}

fn parse_body(body: &Value) -> Result<Submitted, CoreError> {
    let bad = || fetch_failed(500, "Erreur Interne");
    Ok(Submitted {
        crypto_name: body["crypto_name"].as_str().ok_or_else(bad)?.to_string(),
        quantity: body["quantity"].as_f64().ok_or_else(bad)?,
        price_usd: body["price_usd"].as_f64().ok_or_else(bad)?,
        transaction_type: serde_json::from_value(body["transaction_type"].clone()).map_err(|_| bad())?,
        location: body["location"].as_str().ok_or_else(bad)?.to_string(),
        date: NaiveDate::parse_from_str(body["date"].as_str().ok_or_else(bad)?, "%Y-%m-%d")
            .map_err(|_| bad())?,
    })
}

fn positional(t: &Transaction) -> Value {
    let id: Value = t
        .id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(t.id.clone()));
    json!([
        id,
        t.crypto_name,
        t.crypto_id,
        t.quantity,
        t.price_usd,
        t.transaction_type,
        t.location,
        t.date.format("%Y-%m-%d").to_string(),
        t.historical_price,
    ])
}

#[async_trait]
impl BackendTransport for MockBackend {
    fn name(&self) -> &str {
        "Mock"
    }

    fn hosting_mode(&self) -> HostingMode {
        self.mode
    }

    async fn get(&self, path: &str) -> Result<Value, CoreError> {
        self.record("GET", path)?;
        let state = self.lock();
        let owned = segments(path);
        let parts: Vec<&str> = owned.iter().map(String::as_str).collect();
        match parts.as_slice() {
            ["transactions", entry_id] => {
                let rows = state
                    .entries
                    .get(*entry_id)
                    .map(|e| e.transactions.clone())
                    .unwrap_or_default();
                if state.positional_rows {
                    Ok(Value::Array(rows.iter().map(positional).collect()))
                } else {
                    Ok(serde_json::to_value(rows)?)
                }
            }
            ["load_cryptos", entry_id] => {
                let cryptos = state
                    .entries
                    .get(*entry_id)
                    .map(|e| e.cryptos.clone())
                    .unwrap_or_default();
                if state.legacy_cryptos {
                    Ok(Value::Array(
                        cryptos.iter().map(|c| json!([c.name, c.id])).collect(),
                    ))
                } else {
                    Ok(serde_json::to_value(cryptos)?)
                }
            }
            _ => Err(not_found("Not Found")),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, CoreError> {
        self.record("POST", path)?;
        let mut state = self.lock();
        let owned = segments(path);
        let parts: Vec<&str> = owned.iter().map(String::as_str).collect();
        match parts.as_slice() {
            ["transaction", entry_id] => {
                let submitted = parse_body(body)?;
                state.next_id += 1;
                let id = state.next_id.to_string();
                let data = state.entries.entry(entry_id.to_string()).or_default();
                let crypto_id = resolve_crypto_id(data, &submitted.crypto_name)
                    .ok_or_else(|| not_found("Cryptomonnaie introuvable"))?;
                data.transactions.push(Transaction {
                    id,
                    entry_id: entry_id.to_string(),
                    crypto_id,
                    crypto_name: submitted.crypto_name,
                    quantity: submitted.quantity,
                    price_usd: submitted.price_usd,
                    transaction_type: submitted.transaction_type,
                    location: submitted.location,
                    date: submitted.date,
                    historical_price: Some(submitted.price_usd / submitted.quantity),
                });
                Ok(json!({ "message": "Transaction ajoutée" }))
            }
            ["save_crypto"] => {
                let entry_id = body["entry_id"].as_str().unwrap_or_default().to_string();
                let asset = CryptoAsset::new(
                    body["crypto_id"].as_str().unwrap_or_default(),
                    body["crypto_name"].as_str().unwrap_or_default(),
                );
                let data = state.entries.entry(entry_id).or_default();
                if !data.cryptos.iter().any(|c| c.id == asset.id) {
                    data.cryptos.push(asset);
                }
                Ok(json!({ "message": "Crypto sauvegardée" }))
            }
            _ => Err(not_found("Not Found")),
        }
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, CoreError> {
        self.record("PUT", path)?;
        let mut state = self.lock();
        let owned = segments(path);
        let parts: Vec<&str> = owned.iter().map(String::as_str).collect();
        match parts.as_slice() {
            ["transaction", entry_id, transaction_id] => {
                let submitted = parse_body(body)?;
                let data = state
                    .entries
                    .get_mut(*entry_id)
                    .ok_or_else(|| not_found("Entry not found"))?;
                let crypto_id = resolve_crypto_id(data, &submitted.crypto_name)
                    .ok_or_else(|| not_found("Cryptomonnaie introuvable"))?;
                let row = data
                    .transactions
                    .iter_mut()
                    .find(|t| t.id == *transaction_id)
                    .ok_or_else(|| not_found("Transaction not found"))?;
                row.crypto_id = crypto_id;
                row.crypto_name = submitted.crypto_name;
                row.quantity = submitted.quantity;
                row.price_usd = submitted.price_usd;
                row.transaction_type = submitted.transaction_type;
                row.location = submitted.location;
                row.date = submitted.date;
                row.historical_price = Some(submitted.price_usd / submitted.quantity);
                Ok(json!({ "message": "Transaction mise à jour" }))
            }
            _ => Err(not_found("Not Found")),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), CoreError> {
        self.record("DELETE", path)?;
        let mut state = self.lock();
        let owned = segments(path);
        let parts: Vec<&str> = owned.iter().map(String::as_str).collect();
        match parts.as_slice() {
            ["transaction", entry_id, transaction_id] => {
                let data = state
                    .entries
                    .get_mut(*entry_id)
                    .ok_or_else(|| not_found("Entry not found"))?;
                let before = data.transactions.len();
                data.transactions.retain(|t| t.id != *transaction_id);
                if data.transactions.len() == before {
                    return Err(not_found("Transaction not found"));
                }
                Ok(())
            }
            ["crypto", crypto_id] => {
                let mut found = false;
                for data in state.entries.values_mut() {
                    found |= data.cryptos.iter().any(|c| c.id == *crypto_id);
                    data.cryptos.retain(|c| c.id != *crypto_id);
                    data.transactions.retain(|t| t.crypto_id != *crypto_id);
                }
                if found {
                    Ok(())
                } else {
                    Err(not_found("Crypto not found"))
                }
            }
            _ => Err(not_found("Not Found")),
        }
    }

    async fn get_blob(&self, path: &str) -> Result<Vec<u8>, CoreError> {
        self.record("GET", path)?;
        let state = self.lock();
        let owned = segments(path);
        let parts: Vec<&str> = owned.iter().map(String::as_str).collect();
        match parts.as_slice() {
            ["export_db", entry_id] => {
                let data = state.entries.get(*entry_id).cloned().unwrap_or_default();
                serde_json::to_vec(&data).map_err(|e| CoreError::Serialization(e.to_string()))
            }
            _ => Err(not_found("Not Found")),
        }
    }

    async fn post_form(&self, path: &str, form: FormUpload) -> Result<(), CoreError> {
        self.record("POST", path)?;
        if path != "import_db" {
            return Err(not_found("Not Found"));
        }
        if form.file_field != "file" {
            return Err(fetch_failed(400, "file is required"));
        }
        let entry_id = form
            .fields
            .iter()
            .find(|(k, _)| k == "entry_id")
            .map(|(_, v)| v.clone())
            .ok_or_else(|| fetch_failed(400, "entry_id is required"))?;
        let data: EntryData =
            serde_json::from_slice(&form.bytes).map_err(|_| fetch_failed(400, "invalid database file"))?;
        self.lock().entries.insert(entry_id, data);
        Ok(())
    }

    async fn call_service(&self, service: &str, data: &Value) -> Result<(), CoreError> {
        self.record("SERVICE", service)?;
        if self.mode == HostingMode::Standalone {
            return Err(CoreError::Unsupported(service.to_string()));
        }
        match service {
            "delete_crypto" => {
                let entry_id = data["entry_id"].as_str().unwrap_or_default();
                let crypto_id = data["crypto_id"].as_str().unwrap_or_default();
                let mut state = self.lock();
                let entry = state
                    .entries
                    .get_mut(entry_id)
                    .ok_or_else(|| not_found("Entry not found"))?;
                entry.cryptos.retain(|c| c.id != crypto_id);
                entry.transactions.retain(|t| t.crypto_id != crypto_id);
                Ok(())
            }
            _ => Err(not_found("Service not found")),
        }
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn tx(
    id: &str,
    crypto_id: &str,
    crypto_name: &str,
    quantity: f64,
    price_usd: f64,
    transaction_type: TransactionType,
    day: &str,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        entry_id: "E1".to_string(),
        crypto_id: crypto_id.to_string(),
        crypto_name: crypto_name.to_string(),
        quantity,
        price_usd,
        transaction_type,
        location: "Kucoin".to_string(),
        date: date(day),
        historical_price: None,
    }
}

pub fn bitcoin() -> CryptoAsset {
    CryptoAsset::new("btc", "Bitcoin")
}

pub fn ethereum() -> CryptoAsset {
    CryptoAsset::new("eth", "Ethereum")
}

/// Entry "E1": BTC and ETH, interleaved transactions.
pub fn two_asset_backend() -> MockBackend {
    MockBackend::new().with_entry(
        "E1",
        vec![bitcoin(), ethereum()],
        vec![
            tx("1", "btc", "Bitcoin", 0.5, 30000.0, TransactionType::Buy, "2024-01-01"),
            tx("2", "eth", "Ethereum", 2.0, 4000.0, TransactionType::Buy, "2024-01-02"),
            tx("3", "btc", "Bitcoin", 0.25, 20000.0, TransactionType::Sell, "2024-02-01"),
            tx("4", "eth", "Ethereum", 1.0, 2500.0, TransactionType::Sell, "2024-03-01"),
        ],
    )
}
