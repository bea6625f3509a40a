use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Env var that overrides `--log-level` when set.
pub const LOG_ENV: &str = "SIGNALLAB_LOG";

/// Install the global fmt subscriber. Logs go to stderr so stdout stays
/// clean for summaries and tables.
pub fn init_tracing(log_level: &str) -> Result<()> {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| log_level.to_string());
    let env_filter =
        EnvFilter::try_new(&filter).map_err(|err| anyhow!("invalid log filter '{filter}': {err}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
