//! Serializable strategy descriptions and the factory that builds them.
//!
//! `StrategySpec` is what config files and the CLI carry around; the factory
//! turns it into a boxed [`Strategy`] after parameter validation.

use serde::{Deserialize, Serialize};

use super::{
    BollingerReversion, BuyAndHold, Ensemble, KdjCross, MaCross, MaType, MacdCross, RsiThreshold,
    Strategy, StrategyError,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategySpec {
    MaCross {
        #[serde(default = "default_fast")]
        fast: usize,
        #[serde(default = "default_slow")]
        slow: usize,
        #[serde(default)]
        ma_type: MaType,
    },
    MacdCross {
        #[serde(default = "default_macd_fast")]
        fast: usize,
        #[serde(default = "default_macd_slow")]
        slow: usize,
        #[serde(default = "default_macd_signal")]
        signal: usize,
    },
    RsiThreshold {
        #[serde(default = "default_rsi_window")]
        window: usize,
        #[serde(default = "default_oversold")]
        oversold: f64,
        #[serde(default = "default_overbought")]
        overbought: f64,
    },
    BollingerReversion {
        #[serde(default = "default_boll_window")]
        window: usize,
        #[serde(default = "default_boll_k")]
        k: f64,
    },
    KdjCross {
        #[serde(default = "default_kdj_window")]
        window: usize,
        #[serde(default = "default_kdj_smooth")]
        smooth: usize,
    },
    BuyAndHold,
    Ensemble { members: Vec<StrategySpec> },
}

fn default_fast() -> usize {
    5
}
fn default_slow() -> usize {
    20
}
fn default_macd_fast() -> usize {
    12
}
fn default_macd_slow() -> usize {
    26
}
fn default_macd_signal() -> usize {
    9
}
fn default_rsi_window() -> usize {
    14
}
fn default_oversold() -> f64 {
    30.0
}
fn default_overbought() -> f64 {
    70.0
}
fn default_boll_window() -> usize {
    20
}
fn default_boll_k() -> f64 {
    2.0
}
fn default_kdj_window() -> usize {
    9
}
fn default_kdj_smooth() -> usize {
    3
}

impl Default for StrategySpec {
    fn default() -> Self {
        Self::MaCross {
            fast: default_fast(),
            slow: default_slow(),
            ma_type: MaType::Sma,
        }
    }
}

impl StrategySpec {
    /// Parse a short CLI form: `ma_cross`, `ma_cross:5,20`, `ema_cross:12,26`,
    /// `macd`, `rsi:14,30,70`, `boll:20,2`, `kdj:9,3`, `buy_and_hold`.
    pub fn parse_short(input: &str) -> Result<Self, StrategyError> {
        let (kind, args) = match input.split_once(':') {
            Some((kind, args)) => (kind, args),
            None => (input, ""),
        };
        let args: Vec<&str> = args.split(',').filter(|s| !s.is_empty()).collect();

        let int = |i: usize, default: usize| -> Result<usize, StrategyError> {
            args.get(i).map_or(Ok(default), |raw| {
                raw.trim().parse().map_err(|_| {
                    StrategyError::invalid("strategy", format!("'{raw}' is not an integer"))
                })
            })
        };
        let float = |i: usize, default: f64| -> Result<f64, StrategyError> {
            args.get(i).map_or(Ok(default), |raw| {
                raw.trim().parse().map_err(|_| {
                    StrategyError::invalid("strategy", format!("'{raw}' is not a number"))
                })
            })
        };

        match kind.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "ma_cross" | "sma_cross" => Ok(Self::MaCross {
                fast: int(0, default_fast())?,
                slow: int(1, default_slow())?,
                ma_type: MaType::Sma,
            }),
            "ema_cross" => Ok(Self::MaCross {
                fast: int(0, default_fast())?,
                slow: int(1, default_slow())?,
                ma_type: MaType::Ema,
            }),
            "macd" | "macd_cross" => Ok(Self::MacdCross {
                fast: int(0, default_macd_fast())?,
                slow: int(1, default_macd_slow())?,
                signal: int(2, default_macd_signal())?,
            }),
            "rsi" | "rsi_threshold" => Ok(Self::RsiThreshold {
                window: int(0, default_rsi_window())?,
                oversold: float(1, default_oversold())?,
                overbought: float(2, default_overbought())?,
            }),
            "boll" | "bollinger" | "bollinger_reversion" => Ok(Self::BollingerReversion {
                window: int(0, default_boll_window())?,
                k: float(1, default_boll_k())?,
            }),
            "kdj" | "kdj_cross" => Ok(Self::KdjCross {
                window: int(0, default_kdj_window())?,
                smooth: int(1, default_kdj_smooth())?,
            }),
            "buy_and_hold" | "hold" => Ok(Self::BuyAndHold),
            other => Err(StrategyError::invalid(
                "strategy",
                format!("unknown strategy '{other}'"),
            )),
        }
    }
}

/// Build a strategy from its description, validating all parameters.
pub fn build_strategy(spec: &StrategySpec) -> Result<Box<dyn Strategy>, StrategyError> {
    Ok(match spec {
        StrategySpec::MaCross {
            fast,
            slow,
            ma_type,
        } => Box::new(MaCross::new(*fast, *slow, *ma_type)?),
        StrategySpec::MacdCross { fast, slow, signal } => {
            Box::new(MacdCross::new(*fast, *slow, *signal)?)
        }
        StrategySpec::RsiThreshold {
            window,
            oversold,
            overbought,
        } => Box::new(RsiThreshold::new(*window, *oversold, *overbought)?),
        StrategySpec::BollingerReversion { window, k } => {
            Box::new(BollingerReversion::new(*window, *k)?)
        }
        StrategySpec::KdjCross { window, smooth } => Box::new(KdjCross::new(*window, *smooth)?),
        StrategySpec::BuyAndHold => Box::new(BuyAndHold::new()),
        StrategySpec::Ensemble { members } => {
            let built = members
                .iter()
                .map(build_strategy)
                .collect::<Result<Vec<_>, _>>()?;
            Box::new(Ensemble::new(built)?)
        }
    })
}
