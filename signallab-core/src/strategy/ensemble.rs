//! Ensemble: combines several strategies by averaging their numeric signals.
//!
//! The mean of member signals (Buy = 1, Sell = -1, Hold = 0) maps to Buy
//! above 0.5, Sell below -0.5, Hold otherwise. With two members both must
//! agree; with three, two of three suffice unless the third disagrees.

use super::{Strategy, StrategyError};
use crate::domain::{Bar, Signal};

const VOTE_THRESHOLD: f64 = 0.5;

pub struct Ensemble {
    members: Vec<Box<dyn Strategy>>,
    name: String,
}

impl Ensemble {
    pub fn new(members: Vec<Box<dyn Strategy>>) -> Result<Self, StrategyError> {
        if members.is_empty() {
            return Err(StrategyError::EmptyEnsemble);
        }
        let names: Vec<&str> = members.iter().map(|m| m.name()).collect();
        let name = format!("ensemble({})", names.join("+"));
        Ok(Self { members, name })
    }

    pub fn members(&self) -> &[Box<dyn Strategy>] {
        &self.members
    }
}

impl std::fmt::Debug for Ensemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ensemble").field("name", &self.name).finish()
    }
}

impl Strategy for Ensemble {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate_signals(&self, bars: &[Bar]) -> Vec<Signal> {
        let mut totals = vec![0i32; bars.len()];
        for member in &self.members {
            for (total, signal) in totals.iter_mut().zip(member.generate_signals(bars)) {
                *total += i32::from(signal.as_i8());
            }
        }

        let count = self.members.len() as f64;
        totals
            .into_iter()
            .map(|total| {
                let mean = f64::from(total) / count;
                if mean > VOTE_THRESHOLD {
                    Signal::Buy
                } else if mean < -VOTE_THRESHOLD {
                    Signal::Sell
                } else {
                    Signal::Hold
                }
            })
            .collect()
    }
}
