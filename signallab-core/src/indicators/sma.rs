//! Simple Moving Average (SMA).
//!
//! Rolling mean over a trailing window.
//! Lookback: window - 1 (first defined value at index window-1).

use super::{Indicator, Series};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    window: usize,
    name: String,
}

impl Sma {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "SMA window must be >= 1");
        Self {
            window,
            name: format!("sma_{window}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        sma(&closes, self.window)
    }
}

/// Trailing arithmetic mean of `window` values.
///
/// A window wider than the input yields an all-`None` series.
pub fn sma(values: &[f64], window: usize) -> Series {
    assert!(window >= 1, "SMA window must be >= 1");
    let n = values.len();
    let mut result = vec![None; n];

    if n < window {
        return result;
    }

    let mut sum: f64 = values[..window].iter().sum();
    result[window - 1] = Some(sum / window as f64);

    // Roll the window forward
    for i in window..n {
        sum += values[i] - values[i - window];
        result[i] = Some(sum / window as f64);
    }

    result
}

/// SMA over a series that may itself contain undefined values.
///
/// An output is defined only when every value in its trailing window is defined.
pub fn sma_of_series(values: &[Option<f64>], window: usize) -> Series {
    assert!(window >= 1, "SMA window must be >= 1");
    let n = values.len();
    let mut result = vec![None; n];

    if n < window {
        return result;
    }

    for i in (window - 1)..n {
        let slice = &values[(i + 1 - window)..=i];
        let sum: Option<f64> = slice.iter().copied().sum();
        result[i] = sum.map(|s| s / window as f64);
    }

    result
}
