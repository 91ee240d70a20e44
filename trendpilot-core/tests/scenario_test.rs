//! Driver scenarios replayed bar by bar over hand-built feature frames.

use trendpilot_core::decision::TransitionEngine;
use trendpilot_core::domain::PositionLedger;
use trendpilot_core::engine::{BarAction, DriverState, Phase, StrategyConfig, StrategyDriver};
use trendpilot_core::features::{FeatureFrame, FeatureSet};
use trendpilot_core::regime::{RegimeClassifier, TrendState};

/// Textbook strong uptrend: stacked averages, ADX 30, positive momentum.
fn strong_up(momentum: f64) -> FeatureSet {
    FeatureSet {
        close: 10.0,
        volume: 1500.0,
        sma_short: 9.8,
        sma_mid: 9.5,
        sma_long: 9.0,
        ema_fast: 9.7,
        ema_medium: 9.4,
        ema_slow: 8.9,
        bb_mid: 9.5,
        bb_top: 10.5,
        bb_bottom: 8.5,
        macd: 0.2,
        macd_signal: 0.1,
        macd_hist: 0.1,
        rsi: 65.0,
        atr: 0.3,
        stoch_k: 70.0,
        stoch_d: 65.0,
        stoch_j: 80.0,
        adx: 30.0,
        plus_di: 30.0,
        minus_di: 10.0,
        momentum,
        stddev: 0.3,
        stddev_avg: 0.3,
        volume_avg: 1000.0,
        volume_ratio: 1.5,
    }
}

fn driver(config: StrategyConfig) -> StrategyDriver {
    StrategyDriver::new(config).unwrap()
}

#[test]
fn strong_uptrend_entry_then_light_add() {
    // Entry bar scores 3: J below 20 (oversold), momentum turning up, heavy volume.
    let mut entry_bar = strong_up(0.6);
    entry_bar.stoch_j = 15.0;
    let mut features = vec![strong_up(0.4), entry_bar];
    features.extend((0..19).map(|i| strong_up(0.6 + i as f64 * 0.01)));
    let frame = FeatureFrame::from_features(features, 1);

    let d = driver(StrategyConfig {
        initial_cash: 1_000.0,
        base_buy_amount: 200.0,
        ..Default::default()
    });

    let mut state = DriverState::new(1_000.0);
    let entry = d.step(state, &frame.view(1).unwrap());
    assert_eq!(entry.action, BarAction::Entry);
    assert_eq!(entry.trend, TrendState::StrongUp);
    assert!((entry.state.cash - 600.0).abs() < 1e-9);
    state = entry.state;

    let add = d.step(state, &frame.view(2).unwrap());
    assert_eq!(add.directive.ratio, 0.5);
    assert_eq!(add.action, BarAction::Buy);
    assert!((add.state.cash - 500.0).abs() < 1e-9);
    state = add.state;

    // Persistence keeps adding until cash runs out.
    for i in 3..frame.len() {
        state = d.step(state, &frame.view(i).unwrap()).state;
        assert!(state.cash >= 0.0);
    }
    assert!(state.cash.abs() < 1e-9);
    assert!((state.ledger.cost_basis - 1_000.0).abs() < 1e-6);
}

#[test]
fn range_breakout_ignores_other_indicators() {
    let engine = TransitionEngine::default();
    let quiet = FeatureFrame::from_features(vec![strong_up(0.0); 6], 0);
    let mut wild = strong_up(-3.0);
    wild.rsi = 95.0;
    wild.volume = 10_000.0;
    wild.bb_top = 50.0;
    let noisy = FeatureFrame::from_features(vec![wild; 6], 0);

    for frame in [quiet, noisy] {
        let d = engine.decide(
            TrendState::Consolidation,
            TrendState::StrongUp,
            &frame.view(5).unwrap(),
        );
        assert_eq!(d.ratio, 3.0);
        assert_eq!(d.rationale, "forceful breakout, strong entry");
    }
}

#[test]
fn floor_clips_large_trim() {
    let mut down = strong_up(-1.0);
    down.close = 8.0;
    down.sma_short = 8.5;
    down.sma_mid = 9.0;
    down.sma_long = 9.5;
    down.ema_fast = 8.6;
    down.ema_medium = 9.1;
    down.ema_slow = 9.6;
    let frame = FeatureFrame::from_features(vec![down; 2], 0);
    assert_eq!(
        RegimeClassifier::default().classify(frame.get(1).unwrap()),
        TrendState::StrongDown
    );

    let mut ledger = PositionLedger::new();
    ledger.apply_fill(1_000.0, 10.0);
    let state = DriverState {
        phase: Phase::Transition,
        prev_trend: Some(TrendState::StrongDown),
        ledger,
        cash: 0.0,
    };

    // -2 with reduce_step 0.10 asks for 200 shares; a 0.9 floor leaves room for 100.
    let d = driver(StrategyConfig {
        bottom_ratio: 0.9,
        ..Default::default()
    });
    let step = d.step(state, &frame.view(1).unwrap());
    assert_eq!(step.directive.ratio, -2.0);
    assert!((step.fill_shares + 100.0).abs() < 1e-9);
    assert!((step.state.ledger.held_shares - 900.0).abs() < 1e-9);
    assert!((step.state.ledger.realized_pnl + 200.0).abs() < 1e-9);
    assert!((step.state.ledger.avg_cost() - 10.0).abs() < 1e-9);
}

#[test]
fn entry_timeout_forces_entry() {
    let mut flat = strong_up(0.0);
    flat.volume_ratio = 0.9;
    let frame = FeatureFrame::from_features(vec![flat; 10], 0);
    let d = driver(StrategyConfig::default());

    let mut state = DriverState::new(10_000.0);
    let mut actions = Vec::new();
    for i in 1..8 {
        let step = d.step(state, &frame.view(i).unwrap());
        actions.push(step.action);
        state = step.state;
    }
    assert_eq!(&actions[..5], &[BarAction::AwaitingEntry; 5]);
    assert_eq!(actions[5], BarAction::Entry);
    assert_eq!(state.phase, Phase::Transition);
}
