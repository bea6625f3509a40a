//! KDJ stochastic oscillator.
//!
//! - %K: 100 * (close - lowest_low) / (highest_high - lowest_low) over the trailing window
//! - %D: SMA(%K, smooth)
//! - %J: 3 * %K - 2 * %D
//!
//! A flat window (highest_high == lowest_low) has no range; %K is 50 there.
//! Lookback: window - 1 for %K, window + smooth - 2 for %D and %J.

use super::sma::sma_of_series;
use super::{Indicator, Series};
use crate::domain::Bar;

/// The three aligned KDJ series.
#[derive(Debug, Clone, PartialEq)]
pub struct KdjOutput {
    pub k: Series,
    pub d: Series,
    pub j: Series,
}

/// Compute KDJ over OHLC bars.
pub fn kdj(bars: &[Bar], window: usize, smooth: usize) -> KdjOutput {
    assert!(window >= 1, "KDJ window must be >= 1");
    assert!(smooth >= 1, "KDJ smoothing must be >= 1");
    let n = bars.len();
    let mut k = vec![None; n];

    if n >= window {
        for i in (window - 1)..n {
            let slice = &bars[(i + 1 - window)..=i];
            let lowest = slice.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let highest = slice
                .iter()
                .map(|b| b.high)
                .fold(f64::NEG_INFINITY, f64::max);
            let range = highest - lowest;
            k[i] = Some(if range > 0.0 {
                100.0 * (bars[i].close - lowest) / range
            } else {
                50.0
            });
        }
    }

    let d = sma_of_series(&k, smooth);
    let j = k
        .iter()
        .zip(&d)
        .map(|(k, d)| Some(3.0 * (*k)? - 2.0 * (*d)?))
        .collect();

    KdjOutput { k, d, j }
}

/// Which KDJ line an [`Indicator`] instance exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdjLine {
    K,
    D,
    J,
}

#[derive(Debug, Clone)]
pub struct Kdj {
    window: usize,
    smooth: usize,
    line: KdjLine,
    name: String,
}

impl Kdj {
    pub fn new(window: usize, smooth: usize, line: KdjLine) -> Self {
        assert!(window >= 1, "KDJ window must be >= 1");
        assert!(smooth >= 1, "KDJ smoothing must be >= 1");
        let label = match line {
            KdjLine::K => "k",
            KdjLine::D => "d",
            KdjLine::J => "j",
        };
        Self {
            window,
            smooth,
            line,
            name: format!("kdj_{label}_{window}_{smooth}"),
        }
    }
}

impl Indicator for Kdj {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            KdjLine::K => self.window - 1,
            KdjLine::D | KdjLine::J => self.window + self.smooth - 2,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let out = kdj(bars, self.window, self.smooth);
        match self.line {
            KdjLine::K => out.k,
            KdjLine::D => out.d,
            KdjLine::J => out.j,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, warmup_len, DEFAULT_EPSILON};

    #[test]
    fn k_known_value() {
        // make_bars: high = max(open,close)+1, low = min(open,close)-1
        // closes 10, 12, 11 → lows 9, 9, 10; highs 11, 13, 13
        // window 3 at index 2: lowest 9, highest 13, close 11 → 50
        let bars = make_bars(&[10.0, 12.0, 11.0]);
        let out = kdj(&bars, 3, 3);
        assert!(out.k[0].is_none());
        assert!(out.k[1].is_none());
        assert_approx(out.k[2], 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn d_is_sma_of_k_and_j_combines() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 13.0, 15.0, 14.0, 16.0]);
        let out = kdj(&bars, 3, 2);
        assert_eq!(warmup_len(&out.d), 3);
        for i in 3..bars.len() {
            let k = out.k[i].unwrap();
            let d = (out.k[i - 1].unwrap() + k) / 2.0;
            assert_approx(out.d[i], d, DEFAULT_EPSILON);
            assert_approx(out.j[i], 3.0 * k - 2.0 * d, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn k_stays_in_range() {
        let bars = make_bars(&[10.0, 14.0, 9.0, 15.0, 8.0, 16.0, 12.0, 11.0]);
        let out = kdj(&bars, 4, 3);
        for v in out.k.iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn window_wider_than_history() {
        let bars = make_bars(&[10.0, 11.0]);
        let out = kdj(&bars, 9, 3);
        assert!(out.k.iter().all(Option::is_none));
        assert!(out.j.iter().all(Option::is_none));
    }

    #[test]
    fn lookback_per_line() {
        assert_eq!(Kdj::new(9, 3, KdjLine::K).lookback(), 8);
        assert_eq!(Kdj::new(9, 3, KdjLine::D).lookback(), 10);
        assert_eq!(Kdj::new(9, 3, KdjLine::J).lookback(), 10);
    }
}
