//! Look-ahead detection for strategies.
//!
//! A strategy that peeks at future bars produces different signals for a
//! prefix of the data than for the full series. Running it over truncated
//! inputs and comparing against the full run catches that.

use thiserror::Error;

use super::Strategy;
use crate::domain::{Bar, Signal};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookaheadViolation {
    #[error("{strategy}: returned {got} signals for {expected} bars")]
    LengthMismatch {
        strategy: String,
        expected: usize,
        got: usize,
    },

    #[error(
        "{strategy}: signal at index {index} changed from {truncated} to {full} \
         once bars after index {prefix_end} were visible"
    )]
    Divergence {
        strategy: String,
        index: usize,
        prefix_end: usize,
        truncated: Signal,
        full: Signal,
    },
}

/// Compare the full run against runs over `bars[..=cut]` for each checkpoint.
///
/// Checkpoints past the end of `bars` are ignored.
pub fn verify_no_lookahead(
    strategy: &dyn Strategy,
    bars: &[Bar],
    checkpoints: &[usize],
) -> Result<(), LookaheadViolation> {
    let full = strategy.generate_signals(bars);
    check_len(strategy, bars.len(), full.len())?;

    for &cut in checkpoints.iter().filter(|&&c| c < bars.len()) {
        let prefix = &bars[..=cut];
        let truncated = strategy.generate_signals(prefix);
        check_len(strategy, prefix.len(), truncated.len())?;

        if let Some(index) = (0..=cut).find(|&i| truncated[i] != full[i]) {
            return Err(LookaheadViolation::Divergence {
                strategy: strategy.name().to_string(),
                index,
                prefix_end: cut,
                truncated: truncated[index],
                full: full[index],
            });
        }
    }

    Ok(())
}

/// Exhaustive variant: every prefix length. Quadratic, so keep inputs short.
pub fn verify_no_lookahead_every_prefix(
    strategy: &dyn Strategy,
    bars: &[Bar],
) -> Result<(), LookaheadViolation> {
    let checkpoints: Vec<usize> = (0..bars.len()).collect();
    verify_no_lookahead(strategy, bars, &checkpoints)
}

fn check_len(strategy: &dyn Strategy, expected: usize, got: usize) -> Result<(), LookaheadViolation> {
    if expected == got {
        Ok(())
    } else {
        Err(LookaheadViolation::LengthMismatch {
            strategy: strategy.name().to_string(),
            expected,
            got,
        })
    }
}
