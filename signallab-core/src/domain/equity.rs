//! EquityPoint: mark-to-market snapshot at a bar's close.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One point of the equity curve. Exactly one per input bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub cash: f64,
    pub position_value: f64,
    pub total_equity: f64,
}

/// Extract the `total_equity` column of a curve.
pub fn equity_values(curve: &[EquityPoint]) -> Vec<f64> {
    curve.iter().map(|p| p.total_equity).collect()
}
