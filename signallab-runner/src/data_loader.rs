//! Data loading: CSV files or a seeded synthetic random walk.
//!
//! Both paths return bars that already passed sequence validation, so the
//! simulator never sees malformed input from here.
//!
//! Synthetic data is clearly fake and is logged as such.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::value::MapAccessDeserializer;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use signallab_core::domain::{validate_bars, Bar, ValidationError};

/// Errors from data loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
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

    #[error("row {row}: unparseable timestamp '{value}' (expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)")]
    Timestamp { row: usize, value: String },

    #[error("invalid bar data: {0}")]
    Invalid(#[from] ValidationError),

    #[error("invalid synthetic spec: {0}")]
    Synthetic(String),
}

/// One CSV row as written on disk.
#[derive(Debug, Deserialize, Serialize)]
struct CsvRow {
    #[serde(alias = "timestamp", alias = "Date", alias = "datetime")]
    date: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: f64,
}

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn parse_timestamp(row: usize, raw: &str) -> Result<NaiveDateTime, LoadError> {
    let raw = raw.trim();
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| LoadError::Timestamp {
            row,
            value: raw.to_string(),
        })
}

/// Load bars from a CSV file with a header row.
///
/// Columns: `date` (or `timestamp`), `open`, `high`, `low`, `close`, and
/// optionally `volume`. Rows are sorted by timestamp before validation, so
/// files exported newest-first load correctly.
pub fn load_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut bars = Vec::new();
    for (row, record) in reader.deserialize::<CsvRow>().enumerate() {
        let record = record.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        bars.push(Bar {
            timestamp: parse_timestamp(row + 1, &record.date)?,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    validate_bars(&bars)?;

    info!(path = %path.display(), bars = bars.len(), "loaded CSV data");
    Ok(bars)
}

/// Write bars to CSV in the format [`load_csv`] reads.
pub fn save_csv(bars: &[Bar], path: &Path) -> Result<(), LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for bar in bars {
        writer
            .serialize(CsvRow {
                date: bar.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            })
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bars = bars.len(), "wrote CSV data");
    Ok(())
}

/// Parameters for a synthetic random walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSpec {
    #[serde(default = "default_days")]
    pub days: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_start_price")]
    pub start_price: f64,
    /// Mean per-bar return.
    #[serde(default = "default_drift")]
    pub drift: f64,
    /// Standard deviation of per-bar returns.
    #[serde(default = "default_volatility")]
    pub volatility: f64,
    /// Quoted (`"2023-01-02"`) or a bare TOML date (`2023-01-02`).
    #[serde(default = "default_start_date", deserialize_with = "date_or_toml_date")]
    pub start_date: NaiveDate,
}

fn default_days() -> usize {
    500
}
fn default_seed() -> u64 {
    42
}
fn default_start_price() -> f64 {
    50.0
}
fn default_drift() -> f64 {
    0.001
}
fn default_volatility() -> f64 {
    0.02
}
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default()
}

/// Accept `YYYY-MM-DD` strings and native TOML dates. A TOML date literal
/// reaches the visitor as a one-entry map.
fn date_or_toml_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    struct DateVisitor;

    impl<'de> Visitor<'de> for DateVisitor {
        type Value = NaiveDate;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a date such as 2023-01-02")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<NaiveDate, E> {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                .map_err(|e| E::custom(format!("invalid date '{v}': {e}")))
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<NaiveDate, A::Error> {
            let datetime = toml::value::Datetime::deserialize(MapAccessDeserializer::new(map))?;
            let date = datetime.date.ok_or_else(|| {
                <A::Error as de::Error>::custom(format!("'{datetime}' has no date part"))
            })?;
            NaiveDate::from_ymd_opt(
                i32::from(date.year),
                u32::from(date.month),
                u32::from(date.day),
            )
            .ok_or_else(|| {
                <A::Error as de::Error>::custom(format!("'{datetime}' is not a calendar date"))
            })
        }
    }

    deserializer.deserialize_any(DateVisitor)
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            days: default_days(),
            seed: default_seed(),
            start_price: default_start_price(),
            drift: default_drift(),
            volatility: default_volatility(),
            start_date: default_start_date(),
        }
    }
}

impl SyntheticSpec {
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.days == 0 {
            return Err(LoadError::Synthetic("days must be >= 1".into()));
        }
        if !(self.start_price.is_finite() && self.start_price > 0.0) {
            return Err(LoadError::Synthetic(format!(
                "start_price must be positive, got {}",
                self.start_price
            )));
        }
        if !(self.volatility.is_finite() && (0.0..0.5).contains(&self.volatility)) {
            return Err(LoadError::Synthetic(format!(
                "volatility must be in [0, 0.5), got {}",
                self.volatility
            )));
        }
        if !(self.drift.is_finite() && self.drift.abs() < 0.5) {
            return Err(LoadError::Synthetic(format!(
                "drift must be in (-0.5, 0.5), got {}",
                self.drift
            )));
        }
        Ok(())
    }
}

/// Generate a deterministic random walk of daily bars.
///
/// Close follows `price *= 1 + N(drift, volatility)`; open is the previous
/// close and high/low extend up to 2% beyond the open/close range.
pub fn generate_synthetic(spec: &SyntheticSpec) -> Result<Vec<Bar>, LoadError> {
    spec.validate()?;
    warn!(
        seed = spec.seed,
        days = spec.days,
        "generating synthetic data, results are not from a real market"
    );

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let start = spec.start_date.and_time(chrono::NaiveTime::default());
    let mut bars = Vec::with_capacity(spec.days);
    let mut price = spec.start_price;

    for i in 0..spec.days {
        let ret = spec.drift + spec.volatility * standard_normal(&mut rng);
        // Gross return floored at 5% of the previous close
        let open = price;
        let close = price * (1.0 + ret).max(0.05);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.02));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.02));
        let volume = rng.gen_range(1_000_000..10_000_000u64) as f64;

        bars.push(Bar {
            timestamp: start + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }

    validate_bars(&bars)?;
    Ok(bars)
}

/// Standard normal draw via Box-Muller.
fn standard_normal(rng: &mut StdRng) -> f64 {
    // gen::<f64>() is in [0, 1); shift to (0, 1] so ln is finite
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_and_sorts_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "bars.csv",
            "date,open,high,low,close,volume\n\
             2024-01-03,11,12,10,11.5,2000\n\
             2024-01-02,10,11,9,10.5,1000\n",
        );
        let bars = load_csv(&path).unwrap();
        assert_eq!(bars.len(), 2);
        assert!(bars[0].timestamp < bars[1].timestamp);
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[1].volume, 2000.0);
    }

    #[test]
    fn accepts_timestamp_column_with_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "intraday.csv",
            "timestamp,open,high,low,close\n\
             2024-01-02 09:30:00,10,11,9,10\n\
             2024-01-02 09:31:00,10,11,9,10.5\n",
        );
        let bars = load_csv(&path).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].volume, 0.0);
    }

    #[test]
    fn bad_timestamp_reports_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "bad.csv",
            "date,open,high,low,close,volume\n01/02/2024,10,11,9,10,100\n",
        );
        assert!(matches!(
            load_csv(&path),
            Err(LoadError::Timestamp { row: 1, .. })
        ));
    }

    #[test]
    fn invalid_bars_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "inverted.csv",
            "date,open,high,low,close,volume\n2024-01-02,10,9,11,10,100\n",
        );
        assert!(matches!(load_csv(&path), Err(LoadError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_csv(Path::new("/nonexistent/bars.csv")),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn save_then_load_preserves_bars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.csv");
        let bars = generate_synthetic(&SyntheticSpec {
            days: 30,
            ..SyntheticSpec::default()
        })
        .unwrap();
        save_csv(&bars, &path).unwrap();
        let loaded = load_csv(&path).unwrap();
        assert_eq!(loaded.len(), bars.len());
        for (a, b) in loaded.iter().zip(&bars) {
            assert_eq!(a.timestamp, b.timestamp);
            assert_eq!(a.close, b.close);
        }
    }

    #[test]
    fn synthetic_data_is_deterministic() {
        let spec = SyntheticSpec::default();
        let a = generate_synthetic(&spec).unwrap();
        let b = generate_synthetic(&spec).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 500);

        let other = generate_synthetic(&SyntheticSpec {
            seed: 7,
            ..spec
        })
        .unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn synthetic_rejects_bad_spec() {
        let spec = SyntheticSpec {
            days: 0,
            ..SyntheticSpec::default()
        };
        assert!(matches!(
            generate_synthetic(&spec),
            Err(LoadError::Synthetic(_))
        ));
    }
}
