//! Simulator configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default commission: 3 basis points per side.
pub const DEFAULT_COMMISSION_RATE: f64 = 0.0003;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

/// Parameters fixed for the lifetime of a [`Simulator`](super::Simulator).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub initial_capital: f64,
    /// Fraction of traded notional charged on each side (0.0003 = 0.03%).
    pub commission_rate: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            commission_rate: DEFAULT_COMMISSION_RATE,
        }
    }
}

impl SimConfig {
    pub fn new(initial_capital: f64, commission_rate: f64) -> Self {
        Self {
            initial_capital,
            commission_rate,
        }
    }

    /// Frictionless config, mostly for tests.
    pub fn frictionless(initial_capital: f64) -> Self {
        Self::new(initial_capital, 0.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        if !(self.commission_rate.is_finite() && (0.0..1.0).contains(&self.commission_rate)) {
            return Err(ConfigError::CommissionOutOfRange(self.commission_rate));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("initial capital must be positive and finite, got {0}")]
    NonPositiveCapital(f64),

    #[error("commission rate must be in [0, 1), got {0}")]
    CommissionOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_capital() {
        for capital in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                SimConfig::new(capital, 0.0).validate(),
                Err(ConfigError::NonPositiveCapital(_))
            ));
        }
    }

    #[test]
    fn rejects_bad_commission() {
        for rate in [-0.001, 1.0, 2.5, f64::NAN] {
            assert!(matches!(
                SimConfig::new(1000.0, rate).validate(),
                Err(ConfigError::CommissionOutOfRange(_))
            ));
        }
    }
}
