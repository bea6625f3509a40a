//! Strategy contract: turns a bar sequence into one signal per bar.
//!
//! Strategies are portfolio-agnostic: they see only market data, never cash or
//! position state. They compose indicator outputs with threshold or crossover
//! logic; the contract fixes only the output shape and the no-lookahead rule.

pub mod bollinger_reversion;
pub mod buy_and_hold;
pub mod ensemble;
pub mod factory;
pub mod kdj_cross;
pub mod lookahead;
pub mod ma_cross;
pub mod macd_cross;
pub mod rsi_threshold;

pub use bollinger_reversion::BollingerReversion;
pub use buy_and_hold::BuyAndHold;
pub use ensemble::Ensemble;
pub use factory::{build_strategy, StrategySpec};
pub use kdj_cross::KdjCross;
pub use lookahead::{verify_no_lookahead, verify_no_lookahead_every_prefix, LookaheadViolation};
pub use ma_cross::{MaCross, MaType};
pub use macd_cross::MacdCross;
pub use rsi_threshold::RsiThreshold;

use crate::domain::{Bar, Signal};
use thiserror::Error;

/// Trait for signal-producing strategies.
///
/// # Contract
/// - `generate_signals(bars)` returns exactly `bars.len()` signals, index-aligned.
/// - The signal at index `i` may only depend on `bars[0..=i]` (no lookahead).
///
/// The simulator does not enforce the lookahead rule. Breaking it is a logic
/// error in the strategy; [`verify_no_lookahead`] catches it in tests.
pub trait Strategy: Send + Sync {
    /// Human-readable name (e.g., "ma_cross_5_20").
    fn name(&self) -> &str;

    /// Produce one signal per bar.
    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal>;
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        (**self).generate_signals(bars)
    }
}

/// Invalid strategy parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("{strategy}: {reason}")]
    InvalidParameter {
        strategy: &'static str,
        reason: String,
    },

    #[error("ensemble needs at least one member strategy")]
    EmptyEnsemble,
}

impl StrategyError {
    pub(crate) fn invalid(strategy: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            strategy,
            reason: reason.into(),
        }
    }
}

/// Map two aligned series to crossover signals.
///
/// Buy where `fast` crosses above `slow` (fast > slow now, fast <= slow on the
/// previous bar), Sell where it crosses below. Any undefined value on either
/// bar yields Hold.
pub(crate) fn crossover_signals(fast: &[Option<f64>], slow: &[Option<f64>]) -> Vec<Signal> {
    let n = fast.len().min(slow.len());
    let mut signals = vec![Signal::Hold; n];

    for i in 1..n {
        let (Some(f_prev), Some(s_prev), Some(f_cur), Some(s_cur)) =
            (fast[i - 1], slow[i - 1], fast[i], slow[i])
        else {
            continue;
        };

        if f_cur > s_cur && f_prev <= s_prev {
            signals[i] = Signal::Buy;
        } else if f_cur < s_cur && f_prev >= s_prev {
            signals[i] = Signal::Sell;
        }
    }

    signals
}

#[cfg(test)]
pub(crate) fn make_bars(closes: &[f64]) -> Vec<Bar> {
    crate::indicators::make_bars(closes)
}
