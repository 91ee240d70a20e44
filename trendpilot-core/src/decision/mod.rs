//! Transition decisions: (previous regime, current regime) to a sized directive.
//!
//! Order of evaluation for one bar:
//! 1. unchanged regime with a persistence rule,
//! 2. the transition table for changed regimes,
//! 3. the range micro-decision when the current regime is `Consolidation`,
//! 4. "no action".

pub mod range;
pub mod table;

use serde::{Deserialize, Serialize};

use crate::features::BarView;
use crate::regime::{BreakoutAnticipator, TrendState};

pub use range::RangeDecider;
pub use table::{persistence_rule, transition_rule, PERSISTENCE_RULES, TRANSITION_RULES};

pub const NO_ACTION: &str = "no action";

/// Sized recommendation for one bar.
///
/// `ratio > 0`: buy `ratio * base_buy_amount` of cash.
/// `ratio < 0`: sell `|ratio| * reduce_step` of the current holding.
/// `ratio == 0`: do nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub ratio: f64,
    pub rationale: String,
}

impl Directive {
    pub fn new(ratio: f64, rationale: impl Into<String>) -> Self {
        Self {
            ratio,
            rationale: rationale.into(),
        }
    }

    pub fn hold(rationale: impl Into<String>) -> Self {
        Self::new(0.0, rationale)
    }

    pub fn no_action() -> Self {
        Self::hold(NO_ACTION)
    }

    pub fn is_buy(&self) -> bool {
        self.ratio > 0.0
    }

    pub fn is_sell(&self) -> bool {
        self.ratio < 0.0
    }
}

/// Stateless decision engine. The previous regime is passed in by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionEngine {
    pub anticipator: BreakoutAnticipator,
    pub range: RangeDecider,
}

impl TransitionEngine {
    pub fn decide(&self, prev: TrendState, curr: TrendState, view: &BarView<'_>) -> Directive {
        let ruled = if prev == curr {
            persistence_rule(curr)
        } else {
            transition_rule(prev, curr)
        };
        if let Some((ratio, rationale)) = ruled {
            return Directive::new(ratio, rationale);
        }

        if curr == TrendState::Consolidation {
            if self.anticipator.breakout_likely(view) {
                return Directive::hold("range market, awaiting breakout confirmation");
            }
            return self.range.decide(view);
        }

        Directive::no_action()
    }
}
