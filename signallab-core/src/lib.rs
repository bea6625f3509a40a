//! SignalLab Core: domain types, indicators, strategy contract, simulator.
//!
//! This crate contains the deterministic heart of the backtester:
//! - Domain types (bars, signals, positions, trades, equity points)
//! - Indicator library (SMA, EMA, MACD, RSI, Bollinger, KDJ, ATR, OBV)
//! - Strategy trait with built-in strategies and a look-ahead checker
//! - Single-asset Flat/Invested simulator with proportional commission
//!
//! Nothing here performs I/O; loading data, metrics, and reporting live in
//! `signallab-runner`.

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod strategy;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types can cross thread boundaries, which the
    /// runner's parallel sweep relies on.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();
        require_send::<domain::EquityPoint>();
        require_sync::<domain::EquityPoint>();

        // Engine types
        require_send::<engine::SimConfig>();
        require_sync::<engine::SimConfig>();
        require_send::<engine::Simulator>();
        require_sync::<engine::Simulator>();
        require_send::<engine::SimulationResult>();
        require_sync::<engine::SimulationResult>();

        // Strategies
        require_send::<Box<dyn strategy::Strategy>>();
        require_sync::<Box<dyn strategy::Strategy>>();
        require_send::<strategy::Ensemble>();
        require_sync::<strategy::Ensemble>();
        require_send::<strategy::StrategySpec>();
        require_sync::<strategy::StrategySpec>();
    }

    /// Architecture contract: strategies never see portfolio state.
    ///
    /// `generate_signals` takes only bars. If a cash or position parameter is
    /// ever added, this stops compiling.
    #[test]
    fn strategy_trait_has_no_portfolio_parameter() {
        fn _check_trait_object_builds(
            strategy: &dyn strategy::Strategy,
            bars: &[domain::Bar],
        ) -> Vec<domain::Signal> {
            strategy.generate_signals(bars)
        }
    }
}
