//! Indicator library.
//!
//! Every indicator is a pure transform over an ordered price (or OHLCV bar)
//! sequence, producing output series of the same length. Warm-up positions
//! where there is not enough history are `None`, never a silent zero.
//!
//! Each indicator is available two ways:
//! - a free function over raw values (`sma(&closes, 20)`), used by strategies;
//! - a named struct implementing [`Indicator`] over bars, used wherever a
//!   uniform handle is needed (look-ahead checks, benches).
//!
//! Multi-series indicators (MACD, Bollinger, KDJ) return an output struct from
//! the free function and expose one named `Indicator` instance per line.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod kdj;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;

pub use atr::{atr, true_range, Atr};
pub use bollinger::{bollinger, Bollinger, BollingerBand, BollingerOutput};
pub use ema::{ema, ema_of_series, Ema};
pub use kdj::{kdj, Kdj, KdjLine, KdjOutput};
pub use macd::{macd, Macd, MacdLine, MacdOutput};
pub use obv::{obv, Obv};
pub use rsi::{rsi, Rsi};
pub use sma::{sma, sma_of_series, Sma};

use crate::domain::Bar;

/// An indicator output series. `None` marks warm-up (undefined) positions.
pub type Series = Vec<Option<f64>>;

/// Trait for indicators computed over a bar sequence.
///
/// # Look-ahead contamination guard
/// No output at index t may depend on bars after t. Computing over
/// `bars[..n]` must reproduce the first `n` values of the full computation.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading positions that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar sequence.
    ///
    /// Returns a series of the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Series;
}

/// Number of leading undefined values in a series.
pub fn warmup_len(series: &[Option<f64>]) -> usize {
    series.iter().take_while(|v| v.is_none()).count()
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for the first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert a defined value approximately equals `expected`.
#[cfg(test)]
pub fn assert_approx(actual: Option<f64>, expected: f64, epsilon: f64) {
    let actual = actual.unwrap_or_else(|| panic!("expected {expected}, got undefined"));
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
