//! Overbought / oversold predicates.

use serde::{Deserialize, Serialize};

use crate::features::FeatureSet;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const J_OVERBOUGHT: f64 = 80.0;
pub const J_OVERSOLD: f64 = 20.0;

/// RSI above 70, stochastic J above 80, or close above the upper band.
pub fn is_overbought(f: &FeatureSet) -> bool {
    f.rsi > RSI_OVERBOUGHT || f.stoch_j > J_OVERBOUGHT || f.close > f.bb_top
}

/// RSI below 30, stochastic J below 20, or close below the lower band.
pub fn is_oversold(f: &FeatureSet) -> bool {
    f.rsi < RSI_OVERSOLD || f.stoch_j < J_OVERSOLD || f.close < f.bb_bottom
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OscillatorState {
    Oversold,
    Overbought,
    Normal,
}

impl OscillatorState {
    /// Oversold wins when both extremes hold.
    pub fn of(f: &FeatureSet) -> Self {
        if is_oversold(f) {
            OscillatorState::Oversold
        } else if is_overbought(f) {
            OscillatorState::Overbought
        } else {
            OscillatorState::Normal
        }
    }
}

impl std::fmt::Display for OscillatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OscillatorState::Oversold => write!(f, "oversold"),
            OscillatorState::Overbought => write!(f, "overbought"),
            OscillatorState::Normal => write!(f, "normal"),
        }
    }
}
