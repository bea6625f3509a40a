//! On-Balance Volume (OBV).
//!
//! Cumulative volume signed by the close-to-close direction. OBV[0] = 0.

use super::{Indicator, Series};
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct Obv;

impl Obv {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Obv {
    fn name(&self) -> &str {
        "obv"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        obv(bars)
    }
}

pub fn obv(bars: &[Bar]) -> Series {
    let mut total = 0.0;
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i > 0 {
                let prev = bars[i - 1].close;
                if bar.close > prev {
                    total += bar.volume;
                } else if bar.close < prev {
                    total -= bar.volume;
                }
            }
            Some(total)
        })
        .collect()
}
