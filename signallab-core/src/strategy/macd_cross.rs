//! MACD crossover: buy when the MACD line crosses above its signal line.

use super::{crossover_signals, Strategy, StrategyError};
use crate::domain::{closes, Bar, Signal};
use crate::indicators::macd;

#[derive(Debug, Clone)]
pub struct MacdCross {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
    name: String,
}

impl MacdCross {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self, StrategyError> {
        if fast == 0 || signal == 0 {
            return Err(StrategyError::invalid(
                "macd_cross",
                "fast and signal periods must be >= 1",
            ));
        }
        if slow <= fast {
            return Err(StrategyError::invalid(
                "macd_cross",
                format!("slow period ({slow}) must be > fast period ({fast})"),
            ));
        }
        Ok(Self {
            fast,
            slow,
            signal,
            name: format!("macd_cross_{fast}_{slow}_{signal}"),
        })
    }

    pub fn default_params() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
            name: "macd_cross_12_26_9".into(),
        }
    }
}

impl Strategy for MacdCross {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        let out = macd(&closes(bars), self.fast, self.slow, self.signal);
        crossover_signals(&out.macd, &out.signal)
    }
}
