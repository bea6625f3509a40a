//! Backtest runner: wires together strategy, simulator, and metrics.
//!
//! Two entry points:
//! - `run_backtest()`: pre-loaded bars plus a built strategy. No I/O.
//! - `run_from_config()`: validates a `BacktestConfig`, loads its data, then runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use signallab_core::domain::{equity_values, Bar, EquityPoint, Signal, Trade, ValidationError};
use signallab_core::engine::{ConfigError as SimConfigError, SimConfig, Simulator};
use signallab_core::strategy::{build_strategy, Strategy, StrategyError};

use crate::config::{BacktestConfig, ConfigFileError};
use crate::data_loader::LoadError;
use crate::metrics::PerformanceReport;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigFileError),
    #[error("simulation config error: {0}")]
    SimConfig(#[from] SimConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
}

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Strategy name as reported by the strategy.
    pub strategy: String,
    pub config: SimConfig,
    pub signals: Vec<Signal>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub report: PerformanceReport,
    pub bar_count: usize,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl BacktestResult {
    /// Number of non-Hold signals emitted.
    pub fn signal_count(&self) -> usize {
        self.signals.iter().filter(|s| !s.is_hold()).count()
    }
}

/// Run one backtest over pre-loaded bars.
///
/// Signals are generated once over the full series, the simulator walks
/// them, and metrics are computed from the finished curve.
pub fn run_backtest(
    bars: &[Bar],
    strategy: &dyn Strategy,
    config: SimConfig,
    periods_per_year: f64,
) -> Result<BacktestResult, RunError> {
    let simulator = Simulator::new(config)?;
    let signals = strategy.generate_signals(bars);
    let sim = simulator.run(bars, &signals)?;

    let report = PerformanceReport::compute(
        &equity_values(&sim.equity_curve),
        &sim.trades,
        config.initial_capital,
        periods_per_year,
    );

    info!(
        strategy = strategy.name(),
        bars = bars.len(),
        trades = report.trade_count,
        total_return = report.total_return,
        sharpe = report.sharpe_ratio,
        "backtest finished"
    );

    Ok(BacktestResult {
        strategy: strategy.name().to_string(),
        config,
        signals,
        trades: sim.trades,
        equity_curve: sim.equity_curve,
        report,
        bar_count: bars.len(),
        start: bars.first().map(|b| b.timestamp.to_string()),
        end: bars.last().map(|b| b.timestamp.to_string()),
    })
}

/// Validate the config, load its data, build its strategy, and run.
pub fn run_from_config(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let bars = config.data.load()?;
    let strategy = build_strategy(&config.strategy)?;
    info!(
        strategy = strategy.name(),
        synthetic = config.data.is_synthetic(),
        bars = bars.len(),
        "starting backtest"
    );
    run_backtest(
        &bars,
        strategy.as_ref(),
        config.sim_config(),
        config.periods_per_year(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::SyntheticSpec;
    use crate::config::DataSource;
    use signallab_core::strategy::{BuyAndHold, StrategySpec};

    fn synthetic(days: usize) -> Vec<Bar> {
        crate::data_loader::generate_synthetic(&SyntheticSpec {
            days,
            ..SyntheticSpec::default()
        })
        .unwrap()
    }

    #[test]
    fn result_shapes_line_up() {
        let bars = synthetic(200);
        let strategy = build_strategy(&StrategySpec::default()).unwrap();
        let result =
            run_backtest(&bars, strategy.as_ref(), SimConfig::default(), 252.0).unwrap();

        assert_eq!(result.bar_count, 200);
        assert_eq!(result.signals.len(), 200);
        assert_eq!(result.equity_curve.len(), 200);
        assert_eq!(result.report.trade_count, result.trades.len());
        assert_eq!(result.strategy, "sma_cross_5_20");
        assert_eq!(
            result.report.final_equity,
            result.equity_curve.last().unwrap().total_equity
        );
    }

    #[test]
    fn buy_and_hold_tracks_price() {
        let bars = synthetic(100);
        let result =
            run_backtest(&bars, &BuyAndHold::new(), SimConfig::frictionless(1_000_000.0), 252.0)
                .unwrap();
        let price_return = bars[99].close / bars[0].close - 1.0;
        // Whole-unit sizing leaves a little cash idle
        assert!((result.report.total_return - price_return).abs() < 0.01);
        assert_eq!(result.signal_count(), 1);
    }

    #[test]
    fn invalid_sim_config_is_rejected() {
        let bars = synthetic(10);
        let err = run_backtest(&bars, &BuyAndHold::new(), SimConfig::new(-1.0, 0.0), 252.0)
            .unwrap_err();
        assert!(matches!(err, RunError::SimConfig(_)));
    }

    #[test]
    fn runs_from_default_config() {
        let config = BacktestConfig {
            data: DataSource::Synthetic(SyntheticSpec {
                days: 120,
                ..SyntheticSpec::default()
            }),
            ..BacktestConfig::default()
        };
        let result = run_from_config(&config).unwrap();
        assert_eq!(result.bar_count, 120);
        assert_eq!(result.config, config.sim_config());
    }

    #[test]
    fn missing_csv_is_data_error() {
        let config = BacktestConfig {
            data: DataSource::Csv {
                path: "/definitely/not/here.csv".into(),
            },
            ..BacktestConfig::default()
        };
        assert!(matches!(run_from_config(&config), Err(RunError::Data(_))));
    }
}
