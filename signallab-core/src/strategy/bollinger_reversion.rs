//! Bollinger mean reversion: buy below the lower band, sell above the upper band.

use super::{Strategy, StrategyError};
use crate::domain::{closes, Bar, Signal};
use crate::indicators::bollinger;

#[derive(Debug, Clone)]
pub struct BollingerReversion {
    pub window: usize,
    pub k: f64,
    name: String,
}

impl BollingerReversion {
    pub fn new(window: usize, k: f64) -> Result<Self, StrategyError> {
        if window < 2 {
            return Err(StrategyError::invalid(
                "bollinger_reversion",
                "window must be >= 2",
            ));
        }
        if !(k.is_finite() && k > 0.0) {
            return Err(StrategyError::invalid(
                "bollinger_reversion",
                format!("band multiplier must be positive, got {k}"),
            ));
        }
        Ok(Self {
            window,
            k,
            name: format!("boll_reversion_{window}_{k}"),
        })
    }
}

impl Strategy for BollingerReversion {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        let prices = closes(bars);
        let bands = bollinger(&prices, self.window, self.k);

        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| match (bands.lower[i], bands.upper[i]) {
                (Some(lower), _) if close < lower => Signal::Buy,
                (_, Some(upper)) if close > upper => Signal::Sell,
                _ => Signal::Hold,
            })
            .collect()
    }
}
