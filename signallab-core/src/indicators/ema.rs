//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: EMA[0] = x[0]. Defined from index 0, no warm-up gap.

use super::{Indicator, Series};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        ema(&closes, self.span)
    }
}

fn alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// EMA of a fully defined series.
pub fn ema(values: &[f64], span: usize) -> Series {
    assert!(span >= 1, "EMA span must be >= 1");
    let a = alpha(span);
    let mut result = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &x in values {
        let next = match prev {
            None => x,
            Some(p) => a * x + (1.0 - a) * p,
        };
        result.push(Some(next));
        prev = Some(next);
    }

    result
}

/// EMA of a series that may contain undefined values.
///
/// The recursion seeds at the first defined value. Undefined inputs after the
/// seed produce undefined outputs and leave the running state untouched.
/// Used by composed indicators (MACD signal line) that smooth a derived series.
pub fn ema_of_series(values: &[Option<f64>], span: usize) -> Series {
    assert!(span >= 1, "EMA span must be >= 1");
    let a = alpha(span);
    let mut prev: Option<f64> = None;

    values
        .iter()
        .map(|value| {
            let x = (*value)?;
            let next = match prev {
                None => x,
                Some(p) => a * x + (1.0 - a) * p,
            };
            prev = Some(next);
            Some(next)
        })
        .collect()
}
