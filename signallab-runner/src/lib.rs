//! SignalLab Runner: data loading, backtest orchestration, metrics, reporting.
//!
//! This crate builds on `signallab-core` to provide:
//! - CSV loading and seeded synthetic data
//! - TOML run configuration with content-addressed run IDs
//! - Single-backtest runner producing a performance report
//! - Parallel MA-crossover parameter sweeps
//! - Text summaries and JSON/CSV artifacts

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, BacktestSection, ConfigFileError, DataSource, RunId};
pub use data_loader::{generate_synthetic, load_csv, save_csv, LoadError, SyntheticSpec};
pub use metrics::{PerformanceReport, DEFAULT_PERIODS_PER_YEAR};
pub use report::{
    format_summary, format_sweep_table, save_artifacts, ArtifactPaths, ReportError, Summary,
    SweepTable,
};
pub use runner::{run_backtest, run_from_config, BacktestResult, RunError};
pub use sweep::{sweep_ma_cross, ParamGrid, SweepEntry};
