//! Relative Strength Index (RSI).
//!
//! Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: window (needs window price changes).
//! Edge case: avg_loss == 0 → RSI = 100, including a perfectly flat series.

use super::{Indicator, Series};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    window: usize,
    name: String,
}

impl Rsi {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "RSI window must be >= 1");
        Self {
            window,
            name: format!("rsi_{window}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rsi(&closes, self.window)
    }
}

/// RSI over a price series.
pub fn rsi(values: &[f64], window: usize) -> Series {
    assert!(window >= 1, "RSI window must be >= 1");
    let n = values.len();
    let mut result = vec![None; n];

    if n < window + 1 {
        return result;
    }

    // Seed: simple average over the first `window` changes
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=window {
        let change = values[i] - values[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= window as f64;
    avg_loss /= window as f64;
    result[window] = Some(compute_rsi(avg_gain, avg_loss));

    // Wilder smoothing for subsequent values
    let w = window as f64;
    for i in (window + 1)..n {
        let change = values[i] - values[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        avg_gain = (avg_gain * (w - 1.0) + gain) / w;
        avg_loss = (avg_loss * (w - 1.0) + loss) / w;

        result[i] = Some(compute_rsi(avg_gain, avg_loss));
    }

    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
