//! TrendPilot Core: trend classification and transition decisions for a
//! single instrument.
//!
//! Data flows one way:
//! - `domain`: bars, validated series, the position ledger
//! - `indicators` / `features`: per-bar feature sets with no look-ahead
//! - `regime`: six-state trend label, oscillator extremes, breakout
//!   anticipation, volume state
//! - `decision`: (previous, current) regime to a sized directive
//! - `engine`: the strategy driver in execute and advise modes

pub mod decision;
pub mod domain;
pub mod engine;
pub mod features;
pub mod indicators;
pub mod regime;

pub use decision::Directive;
pub use domain::{Bar, PositionLedger, Series, SeriesError};
pub use engine::{
    run_advise, run_execute, Advice, EngineError, ExecutionReport, Mode, StrategyConfig,
    StrategyDriver,
};
pub use regime::TrendState;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: run inputs and outputs can cross threads, so
    /// instruments can be processed in parallel.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Series>();
        require_sync::<Series>();
        require_send::<PositionLedger>();
        require_sync::<PositionLedger>();
        require_send::<StrategyConfig>();
        require_sync::<StrategyConfig>();
        require_send::<StrategyDriver>();
        require_sync::<StrategyDriver>();
        require_send::<ExecutionReport>();
        require_sync::<ExecutionReport>();
        require_send::<Advice>();
        require_sync::<Advice>();
        require_send::<EngineError>();
        require_sync::<EngineError>();
        require_send::<features::FeatureFrame>();
        require_sync::<features::FeatureFrame>();
    }
}
