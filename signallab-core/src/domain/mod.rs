//! Domain types for SignalLab

pub mod bar;
pub mod equity;
pub mod position;
pub mod signal;
pub mod trade;

pub use bar::{closes, validate_bars, Bar, PriceField, ValidationError};
pub use equity::{equity_values, EquityPoint};
pub use position::Position;
pub use signal::Signal;
pub use trade::{ExitReason, Trade};
