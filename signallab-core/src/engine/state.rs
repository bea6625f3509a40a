//! Simulator state machine and run result types.

use serde::{Deserialize, Serialize};

use crate::domain::{EquityPoint, Position, Trade};

/// Position state between bars. There is at most one open position.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SimState {
    #[default]
    Flat,
    Invested(Position),
}

impl SimState {
    pub fn position(&self) -> Option<&Position> {
        match self {
            SimState::Flat => None,
            SimState::Invested(position) => Some(position),
        }
    }

    /// Market value of the open position at `price` (0 when flat).
    pub fn position_value(&self, price: f64) -> f64 {
        self.position().map_or(0.0, |p| p.market_value(price))
    }
}

/// Output of one simulator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Completed round trips in exit order.
    pub trades: Vec<Trade>,
    /// One point per input bar.
    pub equity_curve: Vec<EquityPoint>,
    /// Buy signals ignored because cash could not cover one unit.
    pub skipped_buys: usize,
}

impl SimulationResult {
    pub fn final_equity(&self) -> Option<f64> {
        self.equity_curve.last().map(|p| p.total_equity)
    }

    pub fn total_commission(&self) -> f64 {
        self.trades.iter().map(|t| t.commission).sum()
    }
}
