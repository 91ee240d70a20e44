//! Regime classification: trend label, oscillator extremes, breakout
//! anticipation and volume state, all read from per-bar features.

pub mod breakout;
pub mod oscillator;
pub mod trend;
pub mod volume;

pub use breakout::{BreakoutAnticipator, BreakoutSignals};
pub use oscillator::{is_overbought, is_oversold, OscillatorState};
pub use trend::{RegimeClassifier, TrendState};
pub use volume::VolumeState;
