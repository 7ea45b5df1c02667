use crate::errors::CoreError;
use crate::models::transaction::Transaction;

/// Derives the displayed transaction set from the fetched one.
///
/// Pure logic, no I/O.
pub struct TransactionService;

impl TransactionService {
    pub fn new() -> Self {
        Self
    }

    /// Rows whose `crypto_id` equals `crypto_id`, in their original order.
    ///
    /// This is the only way rows leave the displayed set; applying it twice
    /// gives the same result as applying it once.
    #[must_use]
    pub fn filter_by_crypto(
        &self,
        transactions: &[Transaction],
        crypto_id: &str,
    ) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|t| t.crypto_id == crypto_id)
            .cloned()
            .collect()
    }

    /// Displayed rows for an optional selection: nothing selected shows nothing.
    #[must_use]
    pub fn visible(
        &self,
        transactions: &[Transaction],
        crypto_id: Option<&str>,
    ) -> Vec<Transaction> {
        match crypto_id {
            Some(id) => self.filter_by_crypto(transactions, id),
            None => Vec::new(),
        }
    }

    pub fn find<'a>(
        &self,
        transactions: &'a [Transaction],
        id: &str,
    ) -> Result<&'a Transaction, CoreError> {
        transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound(id.to_string()))
    }
}

impl Default for TransactionService {
    fn default() -> Self {
        Self::new()
    }
}
