//! Serializable backtest configuration, loaded from TOML.
//!
//! ```toml
//! [backtest]
//! initial_capital = 100000.0
//! commission_rate = 0.0003
//! periods_per_year = 252
//!
//! [data]
//! source = "csv"
//! path = "data/600570.csv"
//!
//! [strategy]
//! type = "MA_CROSS"
//! fast = 5
//! slow = 20
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use signallab_core::domain::Bar;
use signallab_core::engine::{
    ConfigError as SimConfigError, SimConfig, DEFAULT_COMMISSION_RATE, DEFAULT_INITIAL_CAPITAL,
};
use signallab_core::strategy::{build_strategy, StrategyError, StrategySpec};

use crate::data_loader::{generate_synthetic, load_csv, LoadError, SyntheticSpec};

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors from reading or validating a config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(String),

    #[error("simulation settings: {0}")]
    Simulation(#[from] SimConfigError),

    #[error("strategy settings: {0}")]
    Strategy(#[from] StrategyError),

    #[error("periods_per_year must be >= 1")]
    ZeroPeriods,

    #[error("data settings: {0}")]
    Data(String),
}

/// The `[backtest]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    #[serde(default = "default_capital")]
    pub initial_capital: f64,
    #[serde(default = "default_commission")]
    pub commission_rate: f64,
    #[serde(default = "default_periods")]
    pub periods_per_year: u32,
}

fn default_capital() -> f64 {
    DEFAULT_INITIAL_CAPITAL
}
fn default_commission() -> f64 {
    DEFAULT_COMMISSION_RATE
}
fn default_periods() -> u32 {
    252
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            initial_capital: default_capital(),
            commission_rate: default_commission(),
            periods_per_year: default_periods(),
        }
    }
}

/// The `[data]` table: where bars come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum DataSource {
    Csv { path: PathBuf },
    Synthetic(SyntheticSpec),
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Synthetic(SyntheticSpec::default())
    }
}

impl DataSource {
    pub fn load(&self) -> Result<Vec<Bar>, LoadError> {
        match self {
            DataSource::Csv { path } => load_csv(path),
            DataSource::Synthetic(spec) => generate_synthetic(spec),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, DataSource::Synthetic(_))
    }
}

/// Everything needed to reproduce one backtest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default)]
    pub backtest: BacktestSection,
    #[serde(default)]
    pub data: DataSource,
    #[serde(default)]
    pub strategy: StrategySpec,
}

impl BacktestConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigFileError> {
        toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))
    }

    pub fn sim_config(&self) -> SimConfig {
        SimConfig::new(self.backtest.initial_capital, self.backtest.commission_rate)
    }

    pub fn periods_per_year(&self) -> f64 {
        f64::from(self.backtest.periods_per_year)
    }

    /// Check every section without running anything.
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        self.sim_config().validate()?;
        if self.backtest.periods_per_year == 0 {
            return Err(ConfigFileError::ZeroPeriods);
        }
        build_strategy(&self.strategy)?;
        match &self.data {
            DataSource::Csv { path } if path.as_os_str().is_empty() => {
                Err(ConfigFileError::Data("csv source needs a path".into()))
            }
            DataSource::Csv { .. } => Ok(()),
            DataSource::Synthetic(spec) => spec
                .validate()
                .map_err(|e| ConfigFileError::Data(e.to_string())),
        }
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs have the same RunId.
    pub fn run_id(&self) -> Result<RunId, ConfigFileError> {
        let json =
            serde_json::to_string(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;
        let hash = blake3::hash(json.as_bytes());
        Ok(hash.to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use signallab_core::strategy::MaType;

    const SAMPLE: &str = r#"
[backtest]
initial_capital = 50000.0
commission_rate = 0.001
periods_per_year = 252

[data]
source = "csv"
path = "data/600570.csv"

[strategy]
type = "MA_CROSS"
fast = 10
slow = 30
ma_type = "ema"
"#;

    #[test]
    fn parses_full_config() {
        let config = BacktestConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.backtest.initial_capital, 50_000.0);
        assert_eq!(
            config.data,
            DataSource::Csv {
                path: PathBuf::from("data/600570.csv")
            }
        );
        assert_eq!(
            config.strategy,
            StrategySpec::MaCross {
                fast: 10,
                slow: 30,
                ma_type: MaType::Ema
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = BacktestConfig::from_toml("").unwrap();
        assert_eq!(config, BacktestConfig::default());
        assert_eq!(config.backtest.initial_capital, 100_000.0);
        assert_eq!(config.backtest.commission_rate, 0.0003);
        assert!(config.data.is_synthetic());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn synthetic_section_with_partial_overrides() {
        let config = BacktestConfig::from_toml(
            "[data]\nsource = \"synthetic\"\ndays = 120\nseed = 7\n",
        )
        .unwrap();
        let DataSource::Synthetic(spec) = &config.data else {
            panic!("expected synthetic source");
        };
        assert_eq!(spec.days, 120);
        assert_eq!(spec.seed, 7);
        assert_eq!(spec.start_price, 50.0);
    }

    #[test]
    fn synthetic_start_date_accepts_bare_and_quoted_dates() {
        let expected = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        for text in [
            "[data]\nsource = \"synthetic\"\nstart_date = 2023-03-01\n",
            "[data]\nsource = \"synthetic\"\nstart_date = \"2023-03-01\"\n",
        ] {
            let config = BacktestConfig::from_toml(text).unwrap();
            let DataSource::Synthetic(spec) = &config.data else {
                panic!("expected synthetic source");
            };
            assert_eq!(spec.start_date, expected, "{text}");
        }

        assert!(matches!(
            BacktestConfig::from_toml("[data]\nsource = \"synthetic\"\nstart_date = \"March\"\n"),
            Err(ConfigFileError::Parse(_))
        ));
    }

    #[test]
    fn validate_catches_each_section() {
        let mut config = BacktestConfig::default();
        config.backtest.commission_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigFileError::Simulation(_))
        ));

        let mut config = BacktestConfig::default();
        config.backtest.periods_per_year = 0;
        assert!(matches!(config.validate(), Err(ConfigFileError::ZeroPeriods)));

        let mut config = BacktestConfig::default();
        config.strategy = StrategySpec::MaCross {
            fast: 30,
            slow: 10,
            ma_type: MaType::Sma,
        };
        assert!(matches!(config.validate(), Err(ConfigFileError::Strategy(_))));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        assert!(matches!(
            BacktestConfig::from_toml("[backtest\ninitial_capital = "),
            Err(ConfigFileError::Parse(_))
        ));
    }

    #[test]
    fn run_id_is_deterministic_and_sensitive() {
        let a = BacktestConfig::from_toml(SAMPLE).unwrap();
        let b = BacktestConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(a.run_id().unwrap(), b.run_id().unwrap());
        assert_eq!(a.run_id().unwrap().len(), 64);

        let mut c = a.clone();
        c.backtest.commission_rate = 0.002;
        assert_ne!(a.run_id().unwrap(), c.run_id().unwrap());
    }

    #[test]
    fn toml_roundtrip() {
        let config = BacktestConfig::from_toml(SAMPLE).unwrap();
        let text = config.to_toml().unwrap();
        assert_eq!(BacktestConfig::from_toml(&text).unwrap(), config);
    }
}
