//! Bollinger Bands: moving average +/- k rolling standard deviations.
//!
//! - Middle: SMA(window)
//! - Upper: middle + k * stddev(window)
//! - Lower: middle - k * stddev(window)
//!
//! Uses sample stddev (divide by N-1), so a window of 1 leaves the outer
//! bands undefined. Lookback: window - 1.

use super::sma::sma;
use super::{Indicator, Series};
use crate::domain::Bar;

/// The three aligned band series.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerOutput {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

/// Compute Bollinger Bands over a price series.
pub fn bollinger(values: &[f64], window: usize, k: f64) -> BollingerOutput {
    let middle = sma(values, window);
    let n = values.len();
    let mut upper = vec![None; n];
    let mut lower = vec![None; n];

    if window >= 2 {
        for i in (window - 1)..n {
            let Some(mean) = middle[i] else { continue };
            let slice = &values[(i + 1 - window)..=i];
            let variance = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (window - 1) as f64;
            let std = variance.sqrt();
            upper[i] = Some(mean + k * std);
            lower[i] = Some(mean - k * std);
        }
    }

    BollingerOutput {
        upper,
        middle,
        lower,
    }
}

/// Which band an [`Indicator`] instance exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    window: usize,
    k: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(window: usize, k: f64, band: BollingerBand) -> Self {
        assert!(window >= 1, "Bollinger window must be >= 1");
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        };
        Self {
            window,
            k,
            band,
            name: format!("boll_{label}_{window}_{k}"),
        }
    }

    pub fn upper(window: usize, k: f64) -> Self {
        Self::new(window, k, BollingerBand::Upper)
    }

    pub fn middle(window: usize, k: f64) -> Self {
        Self::new(window, k, BollingerBand::Middle)
    }

    pub fn lower(window: usize, k: f64) -> Self {
        Self::new(window, k, BollingerBand::Lower)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let out = bollinger(&closes, self.window, self.k);
        match self.band {
            BollingerBand::Upper => out.upper,
            BollingerBand::Middle => out.middle,
            BollingerBand::Lower => out.lower,
        }
    }
}
