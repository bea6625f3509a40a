//! Signal: the discrete per-bar decision a strategy emits.

use serde::{Deserialize, Serialize};

/// Buy/Sell/Hold decision attached to exactly one bar.
///
/// Numeric encoding is `Buy = 1`, `Sell = -1`, `Hold = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::Hold => 0,
        }
    }

    /// Decode the numeric form. Any positive value is Buy, any negative is Sell.
    pub fn from_i8(value: i8) -> Self {
        match value.signum() {
            1 => Signal::Buy,
            -1 => Signal::Sell,
            _ => Signal::Hold,
        }
    }

    pub fn is_hold(self) -> bool {
        matches!(self, Signal::Hold)
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.as_i8()
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        };
        f.write_str(label)
    }
}
