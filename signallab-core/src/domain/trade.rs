//! Trade: a completed round trip from entry to exit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// A Sell signal while invested.
    Signal,
    /// Forced liquidation at the final bar's close.
    EndOfData,
}

/// Immutable record of a completed round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Entry ──
    pub entry_index: usize,
    pub entry_timestamp: NaiveDateTime,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_timestamp: NaiveDateTime,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    // ── Size ──
    pub quantity: f64,

    // ── PnL ──
    /// Entry plus exit commission.
    pub commission: f64,
    /// `(exit - entry) * quantity - commission`.
    pub pnl: f64,
    /// `pnl` as a fraction of entry notional.
    pub pnl_pct: f64,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.pnl < 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }

    pub fn gross_pnl(&self) -> f64 {
        (self.exit_price - self.entry_price) * self.quantity
    }
}
