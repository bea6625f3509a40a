//! Bar: the fundamental market data unit, plus sequence validation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV bar for one trading period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Which price field of a bar failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
}

impl std::fmt::Display for PriceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
        };
        f.write_str(name)
    }
}

/// Malformed or inconsistent simulator input.
///
/// Raised before any simulation step runs, so no partial state is ever exposed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("bar sequence is empty")]
    Empty,

    #[error("length mismatch: {bars} bars but {signals} signals")]
    LengthMismatch { bars: usize, signals: usize },

    #[error("timestamps not strictly increasing at index {index} ({previous} >= {current})")]
    NonMonotonicTimestamp {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("non-positive or non-finite {field} price {value} at index {index}")]
    NonPositivePrice {
        index: usize,
        field: PriceField,
        value: f64,
    },

    #[error("inconsistent OHLC range at index {index}: low={low} open={open} close={close} high={high}")]
    InconsistentRange {
        index: usize,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },

    #[error("negative or non-finite volume {value} at index {index}")]
    InvalidVolume { index: usize, value: f64 },
}

impl Bar {
    /// Check the single-bar invariants: positive finite prices, `low <= open,close <= high`.
    pub fn check(&self, index: usize) -> Result<(), ValidationError> {
        for (field, value) in [
            (PriceField::Open, self.open),
            (PriceField::High, self.high),
            (PriceField::Low, self.low),
            (PriceField::Close, self.close),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ValidationError::NonPositivePrice {
                    index,
                    field,
                    value,
                });
            }
        }

        let consistent = self.low <= self.open
            && self.low <= self.close
            && self.high >= self.open
            && self.high >= self.close;
        if !consistent {
            return Err(ValidationError::InconsistentRange {
                index,
                open: self.open,
                high: self.high,
                low: self.low,
                close: self.close,
            });
        }

        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(ValidationError::InvalidVolume {
                index,
                value: self.volume,
            });
        }

        Ok(())
    }

    /// Convenience predicate over [`Bar::check`].
    pub fn is_sane(&self) -> bool {
        self.check(0).is_ok()
    }
}

/// Validate a whole bar sequence: non-empty, every bar sane, timestamps strictly increasing.
pub fn validate_bars(bars: &[Bar]) -> Result<(), ValidationError> {
    if bars.is_empty() {
        return Err(ValidationError::Empty);
    }

    for (index, bar) in bars.iter().enumerate() {
        bar.check(index)?;
        if index > 0 {
            let previous = bars[index - 1].timestamp;
            if bar.timestamp <= previous {
                return Err(ValidationError::NonMonotonicTimestamp {
                    index,
                    previous,
                    current: bar.timestamp,
                });
            }
        }
    }

    Ok(())
}

/// Extract the close series.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample_bar() -> Bar {
        Bar {
            timestamp: ts(2),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn rejects_high_below_low() {
        let mut bar = sample_bar();
        bar.high = 97.0;
        assert!(matches!(
            bar.check(3),
            Err(ValidationError::InconsistentRange { index: 3, .. })
        ));
    }

    #[test]
    fn rejects_zero_close() {
        let mut bar = sample_bar();
        bar.close = 0.0;
        bar.low = 0.0;
        // low is checked before close
        assert!(matches!(
            bar.check(0),
            Err(ValidationError::NonPositivePrice {
                field: PriceField::Low,
                ..
            })
        ));
    }

    #[test]
    fn rejects_nan_open() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(!bar.is_sane());
    }

    #[test]
    fn rejects_negative_volume() {
        let mut bar = sample_bar();
        bar.volume = -1.0;
        assert!(matches!(
            bar.check(0),
            Err(ValidationError::InvalidVolume { .. })
        ));
    }

    #[test]
    fn sequence_requires_increasing_timestamps() {
        let a = sample_bar();
        let mut b = sample_bar();
        b.timestamp = a.timestamp;
        let err = validate_bars(&[a, b]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NonMonotonicTimestamp { index: 1, .. }
        ));
    }

    #[test]
    fn empty_sequence_rejected() {
        assert_eq!(validate_bars(&[]), Err(ValidationError::Empty));
    }

    #[test]
    fn valid_sequence_accepted() {
        let a = sample_bar();
        let mut b = sample_bar();
        b.timestamp = ts(3);
        assert!(validate_bars(&[a, b]).is_ok());
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
