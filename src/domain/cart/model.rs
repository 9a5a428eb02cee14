use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One cart entry, keyed externally by item id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Aggregate over all cart lines. `total_price` is kept unrounded; rounding
/// to two decimals happens only in the display helper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartTotals {
    pub total_items: u64,
    pub total_price: Decimal,
}

impl CartTotals {
    pub fn display_price(&self) -> String {
        format!("{:.2}", self.total_price.round_dp(2))
    }
}

/// Durable wire format of the cart, stored as JSON under a fixed key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub lines: BTreeMap<String, CartLine>,
    pub saved_at: DateTime<Utc>,
}
