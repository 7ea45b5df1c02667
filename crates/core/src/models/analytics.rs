use serde::{Deserialize, Serialize};

/// Profit/loss of one crypto asset across its transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub crypto_id: String,

    /// USD put in: sum of buy amounts minus sum of sell amounts
    pub investment: f64,

    /// Units bought minus units sold
    pub quantity_held: f64,

    /// quantity_held × current price
    pub current_value: f64,

    /// current_value − investment
    pub profit_loss: f64,

    /// (profit_loss / investment) × 100, or 0 when nothing is invested
    pub profit_loss_percent: f64,
}

/// Totals over every position of an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_investment: f64,
    pub total_value: f64,
    pub total_profit_loss: f64,
    pub total_profit_loss_percent: f64,

    /// Per-asset breakdown, in order of first appearance
    pub details: Vec<PositionSummary>,
}
