//! Moving Average Convergence Divergence (MACD).
//!
//! - MACD line: EMA(fast) - EMA(slow)
//! - Signal line: EMA(MACD line, signal)
//! - Histogram: MACD line - signal line
//!
//! All three lines are defined from index 0 since every EMA is.

use super::ema::{ema, ema_of_series};
use super::{Indicator, Series};
use crate::domain::Bar;

/// The three aligned MACD series.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub macd: Series,
    pub signal: Series,
    pub histogram: Series,
}

/// Compute MACD over a price series.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> MacdOutput {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);

    let macd_line: Series = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ema_of_series(&macd_line, signal);
    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    MacdOutput {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}

/// Which MACD line an [`Indicator`] instance exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(
            fast >= 1 && slow >= 1 && signal >= 1,
            "MACD periods must be >= 1"
        );
        let label = match line {
            MacdLine::Macd => "line",
            MacdLine::Signal => "signal",
            MacdLine::Histogram => "hist",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn default_params(line: MacdLine) -> Self {
        Self::new(12, 26, 9, line)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let out = macd(&closes, self.fast, self.slow, self.signal);
        match self.line {
            MacdLine::Macd => out.macd,
            MacdLine::Signal => out.signal,
            MacdLine::Histogram => out.histogram,
        }
    }
}
