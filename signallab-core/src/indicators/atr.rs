//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), TR[0] = high-low.
//! ATR is the simple moving average of TR over the window.
//! Lookback: window - 1.

use super::sma::sma;
use super::{Indicator, Series};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    window: usize,
    name: String,
}

impl Atr {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "ATR window must be >= 1");
        Self {
            window,
            name: format!("atr_{window}"),
        }
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        atr(bars, self.window)
    }
}

/// True Range series. Always fully defined.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high - bar.low;
            if i == 0 {
                return hl;
            }
            let pc = bars[i - 1].close;
            hl.max((bar.high - pc).abs()).max((bar.low - pc).abs())
        })
        .collect()
}

/// ATR over OHLC bars.
pub fn atr(bars: &[Bar], window: usize) -> Series {
    sma(&true_range(bars), window)
}
