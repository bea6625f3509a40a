//! Buy-and-hold baseline: buy on the first bar, ride to end-of-data liquidation.

use super::Strategy;
use crate::domain::{Bar, Signal};

#[derive(Debug, Clone, Default)]
pub struct BuyAndHold;

impl BuyAndHold {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for BuyAndHold {
    fn name(&self) -> &str {
        "buy_and_hold"
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        let mut signals = vec![Signal::Hold; bars.len()];
        if let Some(first) = signals.first_mut() {
            *first = Signal::Buy;
        }
        signals
    }
}
