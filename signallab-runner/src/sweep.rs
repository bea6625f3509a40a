//! Parameter sweep over MA-crossover windows.
//!
//! Every valid (fast < slow) pair runs as an independent backtest over the
//! same bars. Runs share nothing mutable, so they fan out across the rayon
//! thread pool.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use signallab_core::domain::Bar;
use signallab_core::engine::SimConfig;
use signallab_core::strategy::{MaCross, MaType};

use crate::metrics::PerformanceReport;
use crate::runner::{run_backtest, RunError};

/// Parameter grid specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub fast_windows: Vec<usize>,
    pub slow_windows: Vec<usize>,
    #[serde(default)]
    pub ma_type: MaType,
}

impl ParamGrid {
    /// Fast 5/10/20 against slow 20/50/100.
    pub fn ma_cross_default() -> Self {
        Self {
            fast_windows: vec![5, 10, 20],
            slow_windows: vec![20, 50, 100],
            ma_type: MaType::Sma,
        }
    }

    /// All valid (fast, slow) pairs in grid order.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for &fast in &self.fast_windows {
            for &slow in &self.slow_windows {
                // Skip invalid combinations (fast >= slow)
                if fast == 0 || fast >= slow {
                    continue;
                }
                pairs.push((fast, slow));
            }
        }
        pairs
    }

    pub fn size(&self) -> usize {
        self.pairs().len()
    }
}

/// One row of sweep output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub fast: usize,
    pub slow: usize,
    pub strategy: String,
    pub report: PerformanceReport,
}

/// Run every grid pair in parallel. Results are sorted by Sharpe, best first.
///
/// A pair whose run fails is logged and dropped; the sweep only fails as a
/// whole when the simulator config itself is invalid.
pub fn sweep_ma_cross(
    bars: &[Bar],
    grid: &ParamGrid,
    config: SimConfig,
    periods_per_year: f64,
) -> Result<Vec<SweepEntry>, RunError> {
    config.validate()?;
    let pairs = grid.pairs();
    info!(combinations = pairs.len(), bars = bars.len(), "starting MA-cross sweep");

    let mut entries: Vec<SweepEntry> = pairs
        .par_iter()
        .filter_map(|&(fast, slow)| {
            let outcome = MaCross::new(fast, slow, grid.ma_type)
                .map_err(RunError::from)
                .and_then(|strategy| run_backtest(bars, &strategy, config, periods_per_year));
            match outcome {
                Ok(result) => Some(SweepEntry {
                    fast,
                    slow,
                    strategy: result.strategy,
                    report: result.report,
                }),
                Err(err) => {
                    warn!(fast, slow, error = %err, "sweep run failed");
                    None
                }
            }
        })
        .collect();

    sort_by_sharpe(&mut entries);
    Ok(entries)
}

/// Sort descending by Sharpe; ties keep grid order.
pub fn sort_by_sharpe(entries: &mut [SweepEntry]) {
    entries.sort_by(|a, b| {
        b.report
            .sharpe_ratio
            .partial_cmp(&a.report.sharpe_ratio)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::{generate_synthetic, SyntheticSpec};

    #[test]
    fn pairs_skip_invalid_combinations() {
        let grid = ParamGrid {
            fast_windows: vec![5, 20, 60],
            slow_windows: vec![20, 50],
            ma_type: MaType::Sma,
        };
        assert_eq!(grid.pairs(), vec![(5, 20), (5, 50), (20, 50)]);
        assert_eq!(grid.size(), 3);
    }

    #[test]
    fn default_grid_size() {
        // (5,20) (5,50) (5,100) (10,20) (10,50) (10,100) (20,50) (20,100)
        assert_eq!(ParamGrid::ma_cross_default().size(), 8);
    }

    #[test]
    fn sweep_is_sorted_and_complete() {
        let bars = generate_synthetic(&SyntheticSpec {
            days: 300,
            ..SyntheticSpec::default()
        })
        .unwrap();
        let grid = ParamGrid::ma_cross_default();
        let entries = sweep_ma_cross(&bars, &grid, SimConfig::default(), 252.0).unwrap();

        assert_eq!(entries.len(), grid.size());
        for pair in entries.windows(2) {
            assert!(pair[0].report.sharpe_ratio >= pair[1].report.sharpe_ratio);
        }
    }

    #[test]
    fn sweep_matches_single_runs() {
        let bars = generate_synthetic(&SyntheticSpec {
            days: 150,
            ..SyntheticSpec::default()
        })
        .unwrap();
        let grid = ParamGrid {
            fast_windows: vec![5],
            slow_windows: vec![20],
            ma_type: MaType::Ema,
        };
        let entries = sweep_ma_cross(&bars, &grid, SimConfig::default(), 252.0).unwrap();
        let strategy = MaCross::new(5, 20, MaType::Ema).unwrap();
        let single = run_backtest(&bars, &strategy, SimConfig::default(), 252.0).unwrap();
        assert_eq!(entries[0].report, single.report);
        assert_eq!(entries[0].strategy, "ema_cross_5_20");
    }

    #[test]
    fn invalid_config_fails_whole_sweep() {
        let grid = ParamGrid::ma_cross_default();
        assert!(sweep_ma_cross(&[], &grid, SimConfig::new(0.0, 0.0), 252.0).is_err());
    }
}
