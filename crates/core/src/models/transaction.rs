use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::asset::id_to_string;
use crate::errors::CoreError;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Acquiring the asset
    Buy,
    /// Disposing of the asset
    Sell,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Buy => write!(f, "buy"),
            TransactionType::Sell => write!(f, "sell"),
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(TransactionType::Buy),
            "sell" => Ok(TransactionType::Sell),
            other => Err(CoreError::ValidationError(format!(
                "transaction_type must be 'buy' or 'sell', got '{other}'"
            ))),
        }
    }
}

/// A single buy/sell transaction as held by the backend store.
///
/// The client only ever holds a transient copy: it is discarded and
/// refetched after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Assigned by the backend on creation, immutable afterwards
    pub id: String,

    pub entry_id: String,

    /// References a `CryptoAsset::id` of the same entry
    pub crypto_id: String,

    pub crypto_name: String,

    pub quantity: f64,

    /// Total USD amount of the transaction (not a unit price)
    pub price_usd: f64,

    pub transaction_type: TransactionType,

    /// Exchange or wallet where it happened (e.g. "Kucoin")
    pub location: String,

    pub date: NaiveDate,

    /// Unit price computed by the backend, when it reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_price: Option<f64>,
}

impl Transaction {
    /// The editable fields of this transaction, e.g. to prefill the edit form.
    #[must_use]
    pub fn to_draft(&self) -> TransactionDraft {
        TransactionDraft {
            crypto_name: self.crypto_name.clone(),
            quantity: self.quantity,
            price_usd: self.price_usd,
            transaction_type: self.transaction_type,
            location: self.location.clone(),
            date: self.date,
        }
    }

    /// True when every editable field equals the draft's.
    #[must_use]
    pub fn matches_draft(&self, draft: &TransactionDraft) -> bool {
        self.to_draft() == *draft
    }
}

// ── Create / update payload ─────────────────────────────────────────

/// Fields submitted by the add/edit forms.
///
/// `entry_id` is never part of the draft: it is injected from the current
/// selection. `crypto_id` is resolved by the backend from `crypto_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub crypto_name: String,
    pub quantity: f64,
    pub price_usd: f64,
    pub transaction_type: TransactionType,
    pub location: String,
    pub date: NaiveDate,
}

const FORM_FIELDS: [&str; 6] = [
    "crypto_name",
    "quantity",
    "price_usd",
    "transaction_type",
    "location",
    "date",
];

impl TransactionDraft {
    /// Marshal submitted form values into a draft.
    ///
    /// Enforces what the form's `required` inputs enforce: every field present
    /// and non-blank, numbers parse, the type is buy/sell, the date is `YYYY-MM-DD`.
    /// Anything beyond that is the backend's call.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, CoreError> {
        for field in FORM_FIELDS {
            match form.get(field) {
                Some(v) if !v.trim().is_empty() => {}
                _ => {
                    return Err(CoreError::ValidationError(format!(
                        "field '{field}' is required"
                    )))
                }
            }
        }
        // Presence checked above.
        let get = |field: &str| form.get(field).map(|v| v.trim()).unwrap_or_default();

        Ok(Self {
            crypto_name: get("crypto_name").to_string(),
            quantity: parse_form_number("quantity", get("quantity"))?,
            price_usd: parse_form_number("price_usd", get("price_usd"))?,
            transaction_type: get("transaction_type").parse()?,
            location: get("location").to_string(),
            date: NaiveDate::parse_from_str(get("date"), "%Y-%m-%d").map_err(|e| {
                CoreError::ValidationError(format!("field 'date' must be YYYY-MM-DD: {e}"))
            })?,
        })
    }

    /// JSON body for `POST transaction/{entry_id}`.
    #[must_use]
    pub fn to_create_body(&self, entry_id: &str) -> Value {
        let mut body = self.to_update_body();
        body["entry_id"] = json!(entry_id);
        body
    }

    /// JSON body for `PUT transaction/{entry_id}/{id}`.
    #[must_use]
    pub fn to_update_body(&self) -> Value {
        json!({
            "crypto_name": self.crypto_name,
            "quantity": self.quantity,
            "price_usd": self.price_usd,
            "transaction_type": self.transaction_type,
            "location": self.location,
            "date": self.date.format("%Y-%m-%d").to_string(),
        })
    }
}

/// A number input only ever submits finite values; `str::parse` also takes
/// "NaN", "inf" and overflowing literals, which would reach the backend as `null`.
fn parse_form_number(field: &str, raw: &str) -> Result<f64, CoreError> {
    let value = raw.parse::<f64>().map_err(|_| {
        CoreError::ValidationError(format!("field '{field}' must be a number, got '{raw}'"))
    })?;
    if !value.is_finite() {
        return Err(CoreError::ValidationError(format!(
            "field '{field}' must be a finite number, got '{raw}'"
        )));
    }
    Ok(value)
}

// ── Wire shapes ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum WireTransaction {
    Record(WireRecord),
    /// `[id, crypto_name, crypto_id, quantity, price_usd, transaction_type,
    ///   location, date, historical_price?]`
    Row(Vec<Value>),
}

#[derive(Deserialize)]
struct WireRecord {
    id: Value,
    #[serde(default)]
    entry_id: Option<String>,
    crypto_id: String,
    crypto_name: String,
    quantity: Value,
    price_usd: Value,
    transaction_type: String,
    #[serde(default)]
    location: Option<String>,
    date: String,
    #[serde(default)]
    historical_price: Option<Value>,
}

/// Normalize a `transactions/{entry_id}` payload, preserving backend order.
///
/// Rows lacking an `entry_id` get the one they were requested for. A row that
/// cannot be normalized fails the whole list: rows are never silently dropped.
pub fn transactions_from_wire(
    payload: Value,
    entry_id: &str,
) -> Result<Vec<Transaction>, CoreError> {
    if payload.is_null() {
        return Ok(Vec::new());
    }
    let rows: Vec<WireTransaction> = serde_json::from_value(payload).map_err(|e| {
        CoreError::InvalidResponse(format!("unrecognized transaction list: {e}"))
    })?;

    rows.into_iter()
        .map(|row| match row {
            WireTransaction::Record(r) => from_record(r, entry_id),
            WireTransaction::Row(cols) => from_row(&cols, entry_id),
        })
        .collect()
}

fn from_record(r: WireRecord, entry_id: &str) -> Result<Transaction, CoreError> {
    Ok(Transaction {
        id: id_to_string(&r.id)?,
        entry_id: r.entry_id.unwrap_or_else(|| entry_id.to_string()),
        crypto_id: r.crypto_id,
        crypto_name: r.crypto_name,
        quantity: wire_number("quantity", &r.quantity)?,
        price_usd: wire_number("price_usd", &r.price_usd)?,
        transaction_type: wire_type(&r.transaction_type)?,
        location: r.location.unwrap_or_default(),
        date: wire_date(&r.date)?,
        historical_price: match r.historical_price {
            None | Some(Value::Null) => None,
            Some(v) => Some(wire_number("historical_price", &v)?),
        },
    })
}

fn from_row(cols: &[Value], entry_id: &str) -> Result<Transaction, CoreError> {
    if cols.len() < 8 {
        return Err(CoreError::InvalidResponse(format!(
            "transaction row has {} columns, expected at least 8",
            cols.len()
        )));
    }
    let text = |idx: usize, field: &str| -> Result<String, CoreError> {
        match &cols[idx] {
            Value::String(s) => Ok(s.clone()),
            Value::Null => Ok(String::new()),
            other => Err(CoreError::InvalidResponse(format!(
                "column '{field}' should be text, got {other}"
            ))),
        }
    };

    Ok(Transaction {
        id: id_to_string(&cols[0])?,
        entry_id: entry_id.to_string(),
        crypto_name: text(1, "crypto_name")?,
        crypto_id: text(2, "crypto_id")?,
        quantity: wire_number("quantity", &cols[3])?,
        price_usd: wire_number("price_usd", &cols[4])?,
        transaction_type: wire_type(&text(5, "transaction_type")?)?,
        location: text(6, "location")?,
        date: wire_date(&text(7, "date")?)?,
        historical_price: match cols.get(8) {
            None | Some(Value::Null) => None,
            Some(v) => Some(wire_number("historical_price", v)?),
        },
    })
}

fn wire_number(field: &str, value: &Value) -> Result<f64, CoreError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        CoreError::InvalidResponse(format!("field '{field}' is not a number: {value}"))
    })
}

fn wire_type(raw: &str) -> Result<TransactionType, CoreError> {
    raw.parse()
        .map_err(|_| CoreError::InvalidResponse(format!("unknown transaction_type '{raw}'")))
}

fn wire_date(raw: &str) -> Result<NaiveDate, CoreError> {
    // Some backends return full timestamps; only the day matters.
    let day = raw.split(['T', ' ']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| CoreError::InvalidResponse(format!("invalid date '{raw}': {e}")))
}
