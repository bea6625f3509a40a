//! Integration tests for the simulator.
//!
//! Tests:
//! 1. Hand-computed round trips (with and without commission)
//! 2. All-Hold runs leave equity flat
//! 3. Equity accounting: total == cash + position value at every bar
//! 4. Ledger/curve reconciliation: final equity == capital + sum of trade PnL
//! 5. Validation failures happen before any step

use chrono::NaiveDate;
use signallab_core::domain::{Bar, ExitReason, Signal, ValidationError};
use signallab_core::engine::{SimConfig, Simulator};
use signallab_core::strategy::{build_strategy, BuyAndHold, Strategy, StrategySpec};

use Signal::{Buy, Hold, Sell};

/// Helper: bars from closes with a tight range around each close.
fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: base + chrono::Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 10_000.0,
        })
        .collect()
}

/// Helper: a wavy series long enough to trigger crossovers.
fn wavy_bars(n: usize) -> Vec<Bar> {
    let closes: Vec<f64> = (0..n)
        .map(|i| 100.0 + (i as f64 * 0.15).sin() * 12.0 + i as f64 * 0.05)
        .collect();
    bars_from_closes(&closes)
}

fn frictionless(capital: f64) -> Simulator {
    Simulator::new(SimConfig::frictionless(capital)).unwrap()
}

#[test]
fn hand_computed_round_trip() {
    let bars = bars_from_closes(&[100.0, 102.0, 101.0, 105.0, 103.0]);
    let result = frictionless(1000.0)
        .run(&bars, &[Buy, Hold, Hold, Sell, Hold])
        .unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!((trade.entry_index, trade.exit_index), (0, 3));
    assert_eq!(trade.quantity, 10.0);
    assert_eq!(trade.pnl, 50.0);
    assert!((trade.pnl_pct - 0.05).abs() < 1e-12);
    assert_eq!(result.final_equity(), Some(1050.0));
}

#[test]
fn all_hold_keeps_equity_flat() {
    let bars = wavy_bars(50);
    let signals = vec![Hold; bars.len()];
    let result = frictionless(25_000.0).run(&bars, &signals).unwrap();

    assert!(result.trades.is_empty());
    assert_eq!(result.equity_curve.len(), bars.len());
    assert!(result
        .equity_curve
        .iter()
        .all(|p| p.total_equity == 25_000.0 && p.position_value == 0.0));
}

#[test]
fn flat_price_round_trip_loses_exactly_commission() {
    let bars = bars_from_closes(&[50.0; 6]);
    let rate = 0.001;
    let sim = Simulator::new(SimConfig::new(10_000.0, rate)).unwrap();
    let result = sim.run(&bars, &[Buy, Hold, Sell, Hold, Hold, Hold]).unwrap();

    let trade = &result.trades[0];
    // floor(10000 * 0.999 / 50) = 199
    assert_eq!(trade.quantity, 199.0);
    let expected_commission = 2.0 * 199.0 * 50.0 * rate;
    assert!((trade.commission - expected_commission).abs() < 1e-9);
    assert!((trade.pnl + expected_commission).abs() < 1e-9);
    assert!(trade.is_loser());

    let final_equity = result.final_equity().unwrap();
    assert!((final_equity - (10_000.0 - expected_commission)).abs() < 1e-9);
}

#[test]
fn equity_identity_holds_every_bar() {
    let bars = wavy_bars(300);
    let strategy = build_strategy(&StrategySpec::default()).unwrap();
    let signals = strategy.generate_signals(&bars);
    let sim = Simulator::new(SimConfig::default()).unwrap();
    let result = sim.run(&bars, &signals).unwrap();

    assert!(!result.trades.is_empty(), "wavy data should trigger crossovers");
    for (point, bar) in result.equity_curve.iter().zip(&bars) {
        assert_eq!(point.timestamp, bar.timestamp);
        assert!(point.cash >= 0.0);
        assert!((point.total_equity - (point.cash + point.position_value)).abs() < 1e-9);
    }
}

#[test]
fn ledger_reconciles_with_curve() {
    let bars = wavy_bars(300);
    let sim = Simulator::new(SimConfig::default()).unwrap();
    for spec in ["ma_cross:5,20", "rsi:7,30,70", "boll:15,1.5", "kdj"] {
        let strategy = build_strategy(&StrategySpec::parse_short(spec).unwrap()).unwrap();
        let signals = strategy.generate_signals(&bars);
        let result = sim.run(&bars, &signals).unwrap();

        let pnl: f64 = result.trades.iter().map(|t| t.pnl).sum();
        let final_equity = result.final_equity().unwrap();
        assert!(
            (final_equity - (sim.config().initial_capital + pnl)).abs() < 1e-6,
            "{spec}: final equity {final_equity} does not reconcile with trade PnL {pnl}"
        );
        assert_eq!(result.equity_curve.last().unwrap().position_value, 0.0);
    }
}

#[test]
fn buy_and_hold_is_liquidated_at_end() {
    let bars = wavy_bars(40);
    let signals = BuyAndHold::new().generate_signals(&bars);
    let result = frictionless(100_000.0).run(&bars, &signals).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::EndOfData);
    assert_eq!(trade.exit_index, bars.len() - 1);
    assert_eq!(trade.exit_price, bars[bars.len() - 1].close);
}

#[test]
fn length_mismatch_is_rejected() {
    let bars = bars_from_closes(&[10.0, 11.0, 12.0]);
    assert_eq!(
        frictionless(1000.0).run(&bars, &[Buy, Sell]),
        Err(ValidationError::LengthMismatch { bars: 3, signals: 2 })
    );
}

#[test]
fn malformed_bars_are_rejected_before_any_step() {
    let mut bars = bars_from_closes(&[10.0, 11.0, 12.0]);
    bars[2].low = 20.0;
    assert!(matches!(
        frictionless(1000.0).run(&bars, &[Buy, Hold, Sell]),
        Err(ValidationError::InconsistentRange { index: 2, .. })
    ));

    let mut bars = bars_from_closes(&[10.0, 11.0, 12.0]);
    bars[1].timestamp = bars[0].timestamp;
    assert!(matches!(
        frictionless(1000.0).run(&bars, &[Buy, Hold, Sell]),
        Err(ValidationError::NonMonotonicTimestamp { index: 1, .. })
    ));

    let mut bars = bars_from_closes(&[10.0, 11.0, 12.0]);
    bars[0].close = -1.0;
    assert!(matches!(
        frictionless(1000.0).run(&bars, &[Buy, Hold, Sell]),
        Err(ValidationError::NonPositivePrice { index: 0, .. })
    ));
}
