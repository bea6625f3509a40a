//! RSI threshold: buy on recovery from oversold, sell on retreat from overbought.

use super::{Strategy, StrategyError};
use crate::domain::{closes, Bar, Signal};
use crate::indicators::rsi;

/// Oscillator threshold strategy.
///
/// Buy when RSI crosses up through `oversold`; Sell when it crosses down
/// through `overbought`.
#[derive(Debug, Clone)]
pub struct RsiThreshold {
    pub window: usize,
    pub oversold: f64,
    pub overbought: f64,
    name: String,
}

impl RsiThreshold {
    pub fn new(window: usize, oversold: f64, overbought: f64) -> Result<Self, StrategyError> {
        if window == 0 {
            return Err(StrategyError::invalid("rsi_threshold", "window must be >= 1"));
        }
        if !(0.0 < oversold && oversold < overbought && overbought < 100.0) {
            return Err(StrategyError::invalid(
                "rsi_threshold",
                format!("need 0 < oversold ({oversold}) < overbought ({overbought}) < 100"),
            ));
        }
        Ok(Self {
            window,
            oversold,
            overbought,
            name: format!("rsi_{window}_{oversold}_{overbought}"),
        })
    }

    pub fn default_params() -> Self {
        Self {
            window: 14,
            oversold: 30.0,
            overbought: 70.0,
            name: "rsi_14_30_70".into(),
        }
    }
}

impl Strategy for RsiThreshold {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        let values = rsi(&closes(bars), self.window);
        let mut signals = vec![Signal::Hold; bars.len()];

        for i in 1..values.len() {
            let (Some(prev), Some(cur)) = (values[i - 1], values[i]) else {
                continue;
            };
            if prev <= self.oversold && cur > self.oversold {
                signals[i] = Signal::Buy;
            } else if prev >= self.overbought && cur < self.overbought {
                signals[i] = Signal::Sell;
            }
        }

        signals
    }
}
