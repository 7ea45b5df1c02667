use std::collections::HashMap;

use crate::models::analytics::{PortfolioSummary, PositionSummary};
use crate::models::transaction::{Transaction, TransactionType};

/// Profit/loss over a set of transactions.
///
/// `price_usd` on a transaction is the total amount paid or received, so the
/// investment of a position is what went in on buys minus what came back on
/// sells. Current prices are supplied by the caller (USD per unit); a crypto
/// without a price is valued at zero.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(
        &self,
        transactions: &[Transaction],
        current_prices: &HashMap<String, f64>,
    ) -> PortfolioSummary {
        // Group by crypto id, keeping first-appearance order.
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<&Transaction>> = HashMap::new();
        for t in transactions {
            let group = groups.entry(t.crypto_id.as_str()).or_default();
            if group.is_empty() {
                order.push(t.crypto_id.as_str());
            }
            group.push(t);
        }

        let mut details = Vec::with_capacity(order.len());
        let mut total_investment = 0.0;
        let mut total_value = 0.0;

        for crypto_id in order {
            let price = current_prices.get(crypto_id).copied().unwrap_or(0.0);
            let position = self.position(crypto_id, &groups[crypto_id], price);
            total_investment += position.investment;
            total_value += position.current_value;
            details.push(position);
        }

        let total_profit_loss = total_value - total_investment;
        PortfolioSummary {
            total_investment,
            total_value,
            total_profit_loss,
            total_profit_loss_percent: percent(total_profit_loss, total_investment),
            details,
        }
    }

    fn position(
        &self,
        crypto_id: &str,
        transactions: &[&Transaction],
        current_price: f64,
    ) -> PositionSummary {
        let mut investment = 0.0;
        let mut quantity_held = 0.0;
        for t in transactions {
            match t.transaction_type {
                TransactionType::Buy => {
                    investment += t.price_usd;
                    quantity_held += t.quantity;
                }
                TransactionType::Sell => {
                    investment -= t.price_usd;
                    quantity_held -= t.quantity;
                }
            }
        }

        let current_value = quantity_held * current_price;
        let profit_loss = current_value - investment;
        PositionSummary {
            crypto_id: crypto_id.to_string(),
            investment,
            quantity_held,
            current_value,
            profit_loss,
            profit_loss_percent: percent(profit_loss, investment),
        }
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}
