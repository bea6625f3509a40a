//! SignalLab CLI: run and sweep commands.
//!
//! Commands:
//! - `run`: execute one backtest from a TOML config file and/or command-line flags
//! - `sweep`: grid-search MA-crossover windows in parallel and rank by Sharpe

mod obs;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use signallab_core::strategy::{build_strategy, verify_no_lookahead, MaType, StrategySpec};
use signallab_runner::{
    format_summary, format_sweep_table, run_backtest, save_artifacts, sweep_ma_cross,
    BacktestConfig, DataSource, ParamGrid, SyntheticSpec,
};

#[derive(Parser)]
#[command(
    name = "signallab",
    version,
    about = "SignalLab CLI: single-asset signal backtester"
)]
struct Cli {
    /// Log filter (e.g. info, debug, signallab_core=trace). SIGNALLAB_LOG takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file and/or flags.
    Run {
        /// Path to a TOML config file. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Strategy: ma-cross, ema-cross, macd, rsi, bollinger, kdj, buy-and-hold.
        /// Parameters follow a colon, e.g. `ma-cross:10,50` or `rsi:14,25,75`.
        #[arg(long)]
        strategy: Option<String>,

        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        sim: SimArgs,

        /// Verify the strategy emits identical signals on truncated histories before running.
        #[arg(long, default_value_t = false)]
        check_lookahead: bool,

        /// Output directory for result JSON and CSV exports.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print the summary only; write no files.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Sweep MA-crossover window pairs and rank them by Sharpe ratio.
    Sweep {
        /// Path to a TOML config file supplying data and capital settings.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Fast windows, comma-separated.
        #[arg(long, value_delimiter = ',', default_value = "5,10,20")]
        fast: Vec<usize>,

        /// Slow windows, comma-separated.
        #[arg(long, value_delimiter = ',', default_value = "20,50,100")]
        slow: Vec<usize>,

        /// Use exponential instead of simple moving averages.
        #[arg(long, default_value_t = false)]
        ema: bool,

        /// Show only the best N rows.
        #[arg(long)]
        top: Option<usize>,

        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        sim: SimArgs,
    },
}

/// Where bars come from.
#[derive(Args)]
struct DataArgs {
    /// CSV file with date, open, high, low, close, volume columns.
    #[arg(long, conflicts_with = "synthetic")]
    csv: Option<PathBuf>,

    /// Use a seeded synthetic random walk.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Synthetic data seed.
    #[arg(long, conflicts_with = "csv")]
    seed: Option<u64>,

    /// Number of synthetic bars.
    #[arg(long, conflicts_with = "csv")]
    days: Option<usize>,
}

/// Simulator overrides.
#[derive(Args)]
struct SimArgs {
    /// Starting cash.
    #[arg(long)]
    capital: Option<f64>,

    /// Commission rate charged on each fill, e.g. 0.0003.
    #[arg(long)]
    commission: Option<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    obs::init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Run {
            config,
            strategy,
            data,
            sim,
            check_lookahead,
            output_dir,
            no_save,
        } => {
            let mut cfg = load_base_config(config)?;
            if let Some(short) = strategy {
                cfg.strategy = StrategySpec::parse_short(&short)?;
            }
            data.apply(&mut cfg);
            sim.apply(&mut cfg);
            let output_dir = (!no_save).then_some(output_dir);
            run_cmd(&cfg, check_lookahead, output_dir)
        }
        Commands::Sweep {
            config,
            fast,
            slow,
            ema,
            top,
            data,
            sim,
        } => {
            let mut cfg = load_base_config(config)?;
            data.apply(&mut cfg);
            sim.apply(&mut cfg);
            let grid = ParamGrid {
                fast_windows: fast,
                slow_windows: slow,
                ma_type: if ema { MaType::Ema } else { MaType::Sma },
            };
            sweep_cmd(&cfg, &grid, top)
        }
    }
}

fn load_base_config(path: Option<PathBuf>) -> Result<BacktestConfig> {
    match path {
        Some(path) => BacktestConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(BacktestConfig::default()),
    }
}

impl DataArgs {
    fn apply(self, cfg: &mut BacktestConfig) {
        if let Some(path) = self.csv {
            cfg.data = DataSource::Csv { path };
            return;
        }
        if !self.synthetic && self.seed.is_none() && self.days.is_none() {
            return;
        }
        let mut spec = match &cfg.data {
            DataSource::Synthetic(spec) => spec.clone(),
            DataSource::Csv { .. } => SyntheticSpec::default(),
        };
        if let Some(seed) = self.seed {
            spec.seed = seed;
        }
        if let Some(days) = self.days {
            spec.days = days;
        }
        cfg.data = DataSource::Synthetic(spec);
    }
}

impl SimArgs {
    fn apply(self, cfg: &mut BacktestConfig) {
        if let Some(capital) = self.capital {
            cfg.backtest.initial_capital = capital;
        }
        if let Some(commission) = self.commission {
            cfg.backtest.commission_rate = commission;
        }
    }
}

fn run_cmd(cfg: &BacktestConfig, check_lookahead: bool, output_dir: Option<PathBuf>) -> Result<()> {
    cfg.validate()?;
    let run_id = cfg.run_id()?;
    let bars = cfg.data.load()?;
    let strategy = build_strategy(&cfg.strategy)?;
    info!(run_id = %run_id, strategy = strategy.name(), bars = bars.len(), "run");

    if check_lookahead {
        let checkpoints = lookahead_checkpoints(bars.len());
        verify_no_lookahead(strategy.as_ref(), &bars, &checkpoints)?;
        println!(
            "Lookahead check passed ({} truncated histories)",
            checkpoints.len()
        );
    }

    let result = run_backtest(
        &bars,
        strategy.as_ref(),
        cfg.sim_config(),
        cfg.periods_per_year(),
    )?;

    println!("{}", format_summary(&result));

    if let Some(output_dir) = output_dir {
        let run_dir = output_dir.join(run_id.get(..12).unwrap_or(&run_id));
        let paths = save_artifacts(&result, &run_dir)?;
        std::fs::write(run_dir.join("config.toml"), cfg.to_toml()?)
            .with_context(|| format!("writing config to {}", run_dir.display()))?;
        println!("Artifacts saved to: {}", run_dir.display());
        println!("  {}", paths.result_json.display());
        println!("  {}", paths.trades_csv.display());
        println!("  {}", paths.equity_csv.display());
    }

    Ok(())
}

fn sweep_cmd(cfg: &BacktestConfig, grid: &ParamGrid, top: Option<usize>) -> Result<()> {
    if grid.size() == 0 {
        bail!("no valid (fast, slow) pairs: every fast window must be smaller than a slow window");
    }
    cfg.validate()?;
    let bars = cfg.data.load()?;

    let entries = sweep_ma_cross(&bars, grid, cfg.sim_config(), cfg.periods_per_year())?;
    let shown = top.map_or(entries.len(), |n| n.min(entries.len()));

    println!(
        "Sweep: {} of {} combinations over {} bars",
        entries.len(),
        grid.size(),
        bars.len()
    );
    println!("{}", format_sweep_table(&entries[..shown]));
    Ok(())
}

/// About twenty evenly spaced cut points, always including the last bar.
fn lookahead_checkpoints(len: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let step = (len / 20).max(1);
    let mut cuts: Vec<usize> = (0..len).step_by(step).collect();
    if cuts.last() != Some(&(len - 1)) {
        cuts.push(len - 1);
    }
    cuts
}
