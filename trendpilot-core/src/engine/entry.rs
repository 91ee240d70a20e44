//! Entry-quality score gating the first position.

use serde::{Deserialize, Serialize};

use crate::features::BarView;
use crate::regime::is_oversold;

/// Close within this factor of the lower band counts as near support.
pub const NEAR_LOWER_BAND: f64 = 1.02;

/// Four one-point signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryScore {
    pub oversold: bool,
    pub momentum_turning: bool,
    pub near_lower_band: bool,
    pub volume_expanding: bool,
}

impl EntryScore {
    pub fn evaluate(view: &BarView<'_>) -> Self {
        let f = view.current();
        let momentum_turning =
            f.momentum > 0.0 && view.lag(1).is_some_and(|p| f.momentum > p.momentum);
        Self {
            oversold: is_oversold(f),
            momentum_turning,
            near_lower_band: f.close <= f.bb_bottom * NEAR_LOWER_BAND,
            volume_expanding: f.volume_ratio > 1.0,
        }
    }

    pub fn points(&self) -> u8 {
        [
            self.oversold,
            self.momentum_turning,
            self.near_lower_band,
            self.volume_expanding,
        ]
        .iter()
        .map(|&s| s as u8)
        .sum()
    }

    /// Entry size in units of the entry amount: 2 at 3+ points, 1 at 2, else 0.
    pub fn multiplier(&self) -> f64 {
        match self.points() {
            p if p >= 3 => 2.0,
            2 => 1.0,
            _ => 0.0,
        }
    }
}
