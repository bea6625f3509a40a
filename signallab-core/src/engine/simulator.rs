//! The bar loop: signal → state transition → mark-to-market.

use tracing::{debug, trace};

use super::config::{ConfigError, SimConfig};
use super::state::{SimState, SimulationResult};
use crate::domain::{
    validate_bars, Bar, EquityPoint, ExitReason, Position, Signal, Trade, ValidationError,
};

/// Long-only, all-in simulator with proportional commission.
///
/// Fills happen at the bar's close. A Buy while flat spends as many whole
/// units as cash covers after commission; a Sell while invested closes the
/// whole position. Every other signal/state combination is a no-op.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: SimConfig,
}

impl Simulator {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run over `bars` with one signal per bar.
    ///
    /// All inputs are validated before the first step; on error no partial
    /// result is produced.
    pub fn run(&self, bars: &[Bar], signals: &[Signal]) -> Result<SimulationResult, ValidationError> {
        if bars.len() != signals.len() {
            return Err(ValidationError::LengthMismatch {
                bars: bars.len(),
                signals: signals.len(),
            });
        }
        validate_bars(bars)?;

        let rate = self.config.commission_rate;
        let last = bars.len() - 1;
        let mut cash = self.config.initial_capital;
        let mut state = SimState::Flat;
        let mut trades = Vec::new();
        let mut equity_curve = Vec::with_capacity(bars.len());
        let mut skipped_buys = 0;

        for (i, (bar, &signal)) in bars.iter().zip(signals).enumerate() {
            match (signal, &state) {
                (Signal::Buy, SimState::Flat) => {
                    let quantity = (cash * (1.0 - rate) / bar.close).floor();
                    if quantity < 1.0 {
                        debug!(
                            index = i,
                            cash,
                            close = bar.close,
                            "insufficient funds for one unit, buy skipped"
                        );
                        skipped_buys += 1;
                    } else {
                        let notional = quantity * bar.close;
                        let commission = notional * rate;
                        cash -= notional + commission;
                        trace!(index = i, quantity, price = bar.close, "opened position");
                        state = SimState::Invested(Position {
                            quantity,
                            entry_price: bar.close,
                            entry_timestamp: bar.timestamp,
                            entry_index: i,
                            entry_commission: commission,
                        });
                    }
                }
                (Signal::Sell, SimState::Invested(position)) => {
                    let (trade, proceeds) = close_position(position, i, bar, rate, ExitReason::Signal);
                    trace!(index = i, pnl = trade.pnl, "closed position");
                    cash += proceeds;
                    trades.push(trade);
                    state = SimState::Flat;
                }
                _ => {}
            }

            if i == last {
                if let SimState::Invested(position) = &state {
                    let (trade, proceeds) =
                        close_position(position, i, bar, rate, ExitReason::EndOfData);
                    debug!(index = i, pnl = trade.pnl, "liquidated open position at end of data");
                    cash += proceeds;
                    trades.push(trade);
                    state = SimState::Flat;
                }
            }

            let position_value = state.position_value(bar.close);
            equity_curve.push(EquityPoint {
                timestamp: bar.timestamp,
                cash,
                position_value,
                total_equity: cash + position_value,
            });
        }

        debug!(
            bars = bars.len(),
            trades = trades.len(),
            skipped_buys,
            final_equity = cash,
            "simulation finished"
        );

        Ok(SimulationResult {
            trades,
            equity_curve,
            skipped_buys,
        })
    }
}

/// Close `position` at `bar.close`. Returns the trade and the net cash proceeds.
fn close_position(
    position: &Position,
    index: usize,
    bar: &Bar,
    rate: f64,
    reason: ExitReason,
) -> (Trade, f64) {
    let notional = position.quantity * bar.close;
    let exit_commission = notional * rate;
    let commission = position.entry_commission + exit_commission;
    let pnl = (bar.close - position.entry_price) * position.quantity - commission;

    let trade = Trade {
        entry_index: position.entry_index,
        entry_timestamp: position.entry_timestamp,
        entry_price: position.entry_price,
        exit_index: index,
        exit_timestamp: bar.timestamp,
        exit_price: bar.close,
        exit_reason: reason,
        quantity: position.quantity,
        commission,
        pnl,
        pnl_pct: pnl / position.cost_basis(),
    };

    (trade, notional - exit_commission)
}
