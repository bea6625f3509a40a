//! Human-readable summaries and on-disk run artifacts.
//!
//! Artifacts written by [`save_artifacts`]:
//! - `result.json`: the full `BacktestResult`
//! - `trades.csv`: one row per completed trade
//! - `equity.csv`: one row per bar

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use signallab_core::domain::ExitReason;

use crate::runner::BacktestResult;
use crate::sweep::SweepEntry;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("serialize result: {0}")]
    Json(#[from] serde_json::Error),
}

/// Artifact paths returned after export.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub result_json: PathBuf,
    pub trades_csv: PathBuf,
    pub equity_csv: PathBuf,
}

#[derive(Serialize)]
struct TradeRow<'a> {
    entry_time: String,
    exit_time: String,
    entry_price: f64,
    exit_price: f64,
    quantity: f64,
    commission: f64,
    pnl: f64,
    pnl_pct: f64,
    bars_held: usize,
    exit_reason: &'a str,
}

#[derive(Serialize)]
struct EquityRow {
    timestamp: String,
    cash: f64,
    position_value: f64,
    total_equity: f64,
}

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Fixed-width summary block for terminal output.
pub struct Summary<'a>(pub &'a BacktestResult);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        let r = &result.report;
        let rule = "=".repeat(60);
        let thin = "-".repeat(60);
        let ratio = r
            .profit_loss_ratio
            .map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));

        writeln!(f, "{rule}")?;
        writeln!(f, "Backtest summary")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Strategy:           {}", result.strategy)?;
        if let (Some(start), Some(end)) = (&result.start, &result.end) {
            writeln!(f, "Period:             {start} .. {end} ({} bars)", result.bar_count)?;
        }
        writeln!(f, "{thin}")?;
        writeln!(f, "Initial capital:    {:.2}", r.initial_capital)?;
        writeln!(f, "Final equity:       {:.2}", r.final_equity)?;
        writeln!(f, "Total return:       {}", pct(r.total_return))?;
        writeln!(f, "Annualized return:  {}", pct(r.annualized_return))?;
        writeln!(f, "Max drawdown:       {}", pct(r.max_drawdown))?;
        writeln!(f, "Sharpe ratio:       {:.2}", r.sharpe_ratio)?;
        writeln!(f, "{thin}")?;
        writeln!(f, "Trades:             {}", r.trade_count)?;
        writeln!(f, "Win rate:           {}", pct(r.win_rate))?;
        writeln!(f, "Profit/loss ratio:  {ratio}")?;
        writeln!(f, "Average win:        {:.2}", r.avg_win)?;
        writeln!(f, "Average loss:       {:.2}", r.avg_loss)?;
        writeln!(f, "Commission paid:    {:.2}", r.total_commission)?;
        writeln!(f, "{rule}")
    }
}

/// Sweep results as a ranked table, best first.
pub struct SweepTable<'a>(pub &'a [SweepEntry]);

impl fmt::Display for SweepTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>4}  {:<22} {:>10} {:>10} {:>8} {:>7}",
            "rank", "strategy", "return", "max_dd", "sharpe", "trades"
        )?;
        for (i, entry) in self.0.iter().enumerate() {
            let r = &entry.report;
            writeln!(
                f,
                "{:>4}  {:<22} {:>10} {:>10} {:>8.2} {:>7}",
                i + 1,
                entry.strategy,
                pct(r.total_return),
                pct(r.max_drawdown),
                r.sharpe_ratio,
                r.trade_count
            )?;
        }
        Ok(())
    }
}

pub fn format_summary(result: &BacktestResult) -> String {
    Summary(result).to_string()
}

pub fn format_sweep_table(entries: &[SweepEntry]) -> String {
    SweepTable(entries).to_string()
}

/// Write `result.json`, `trades.csv`, and `equity.csv` under `dir`.
pub fn save_artifacts(result: &BacktestResult, dir: &Path) -> Result<ArtifactPaths, ReportError> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let paths = ArtifactPaths {
        result_json: dir.join("result.json"),
        trades_csv: dir.join("trades.csv"),
        equity_csv: dir.join("equity.csv"),
    };

    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(&paths.result_json, json).map_err(|source| ReportError::Io {
        path: paths.result_json.clone(),
        source,
    })?;

    write_csv(
        &paths.trades_csv,
        result.trades.iter().map(|t| TradeRow {
            entry_time: t.entry_timestamp.to_string(),
            exit_time: t.exit_timestamp.to_string(),
            entry_price: t.entry_price,
            exit_price: t.exit_price,
            quantity: t.quantity,
            commission: t.commission,
            pnl: t.pnl,
            pnl_pct: t.pnl_pct,
            bars_held: t.bars_held(),
            exit_reason: match t.exit_reason {
                ExitReason::Signal => "signal",
                ExitReason::EndOfData => "end_of_data",
            },
        }),
    )?;

    write_csv(
        &paths.equity_csv,
        result.equity_curve.iter().map(|p| EquityRow {
            timestamp: p.timestamp.to_string(),
            cash: p.cash,
            position_value: p.position_value,
            total_equity: p.total_equity,
        }),
    )?;

    info!(dir = %dir.display(), "saved run artifacts");
    Ok(paths)
}

fn write_csv<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<(), ReportError> {
    let csv_err = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
