//! Single-asset simulator.
//!
//! Consumes validated bars plus an index-aligned signal sequence and walks
//! them once, bar by bar:
//!
//! 1. Apply the bar's signal to the Flat/Invested state machine at the close
//! 2. On the final bar, force-liquidate any open position
//! 3. Mark to market and append one equity point

pub mod config;
pub mod simulator;
pub mod state;

pub use config::{ConfigError, SimConfig, DEFAULT_COMMISSION_RATE, DEFAULT_INITIAL_CAPITAL};
pub use simulator::Simulator;
pub use state::{SimState, SimulationResult};
