//! Moving average crossover: golden cross buys, death cross sells.

use serde::{Deserialize, Serialize};

use super::{crossover_signals, Strategy, StrategyError};
use crate::domain::{closes, Bar, Signal};
use crate::indicators::{ema, sma};

/// Moving average type selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaType {
    #[default]
    Sma,
    Ema,
}

impl MaType {
    fn prefix(&self) -> &'static str {
        match self {
            MaType::Sma => "sma",
            MaType::Ema => "ema",
        }
    }
}

/// Moving average crossover strategy.
///
/// Buy when the fast MA crosses above the slow MA, Sell when it crosses
/// below. No signal fires until both averages are defined on two
/// consecutive bars, so the first possible signal is at index `slow`
/// for SMAs.
#[derive(Debug, Clone)]
pub struct MaCross {
    pub fast: usize,
    pub slow: usize,
    pub ma_type: MaType,
    name: String,
}

impl MaCross {
    pub fn new(fast: usize, slow: usize, ma_type: MaType) -> Result<Self, StrategyError> {
        if fast == 0 {
            return Err(StrategyError::invalid("ma_cross", "fast window must be >= 1"));
        }
        if slow <= fast {
            return Err(StrategyError::invalid(
                "ma_cross",
                format!("slow window ({slow}) must be > fast window ({fast})"),
            ));
        }
        Ok(Self {
            fast,
            slow,
            ma_type,
            name: format!("{}_cross_{fast}_{slow}", ma_type.prefix()),
        })
    }

    fn average(&self, values: &[f64], window: usize) -> Vec<Option<f64>> {
        match self.ma_type {
            MaType::Sma => sma(values, window),
            MaType::Ema => ema(values, window),
        }
    }
}

impl Strategy for MaCross {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        let prices = closes(bars);
        let fast = self.average(&prices, self.fast);
        let slow = self.average(&prices, self.slow);
        crossover_signals(&fast, &slow)
    }
}
