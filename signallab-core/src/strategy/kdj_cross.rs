//! KDJ crossover: buy when %K crosses above %D, sell when it crosses below.

use super::{crossover_signals, Strategy, StrategyError};
use crate::domain::{Bar, Signal};
use crate::indicators::kdj;

#[derive(Debug, Clone)]
pub struct KdjCross {
    pub window: usize,
    pub smooth: usize,
    name: String,
}

impl KdjCross {
    pub fn new(window: usize, smooth: usize) -> Result<Self, StrategyError> {
        if window == 0 || smooth == 0 {
            return Err(StrategyError::invalid(
                "kdj_cross",
                "window and smoothing must be >= 1",
            ));
        }
        Ok(Self {
            window,
            smooth,
            name: format!("kdj_cross_{window}_{smooth}"),
        })
    }
}

impl Strategy for KdjCross {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        let out = kdj(bars, self.window, self.smooth);
        crossover_signals(&out.k, &out.d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::make_bars;

    #[test]
    fn turn_up_buys() {
        let bars = make_bars(&[20.0, 18.0, 16.0, 14.0, 12.0, 10.0, 14.0, 18.0]);
        let signals = KdjCross::new(3, 2).unwrap().generate_signals(&bars);
        assert_eq!(signals.len(), bars.len());
        assert!(signals[6..].contains(&Signal::Buy));
        assert!(!signals[..6].contains(&Signal::Buy));
    }

    #[test]
    fn rejects_zero_window() {
        assert!(KdjCross::new(0, 3).is_err());
    }
}
