//! Position: the single open long holding during a run.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An open long position. Created on a filled Buy, destroyed on Sell or end-of-data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Whole units held; always > 0 while the position exists.
    pub quantity: f64,
    pub entry_price: f64,
    pub entry_timestamp: NaiveDateTime,
    pub entry_index: usize,
    /// Commission paid when the position was opened.
    pub entry_commission: f64,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    /// Entry notional, excluding commission.
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.entry_price
    }
}
