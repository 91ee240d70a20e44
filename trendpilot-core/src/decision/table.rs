//! Persistence and transition lookup tables.

use crate::regime::TrendState::{self, *};

/// Regime held from one bar to the next.
pub const PERSISTENCE_RULES: [(TrendState, f64, &str); 4] = [
    (WeakUp, 0.5, "hold trend, small add"),
    (WeakDown, -1.0, "hold trend, small trim"),
    (StrongUp, 0.5, "hold strong trend, light add"),
    (StrongDown, -2.0, "hold strong downtrend, large trim"),
];

/// Regime changes, `(prev, curr, ratio, rationale)`.
pub const TRANSITION_RULES: [(TrendState, TrendState, f64, &str); 14] = [
    (Consolidation, WeakUp, 1.0, "tentative entry on breakout from range"),
    (WeakUp, StrongUp, 2.0, "accelerating, add aggressively"),
    (Consolidation, StrongUp, 3.0, "forceful breakout, strong entry"),
    (StrongUp, WeakUp, -1.0, "momentum fading, trim 10%"),
    (WeakUp, Consolidation, -1.0, "momentum fading, trim 10%"),
    (StrongUp, Consolidation, -2.0, "possible top, trim 20%"),
    (Consolidation, WeakDown, -3.0, "turning down, trim 20%"),
    (WeakDown, StrongDown, -4.0, "accelerating down, trim 40%"),
    (Consolidation, StrongDown, -5.0, "sharp breakdown, trim 50%"),
    (StrongDown, WeakDown, 0.0, "deceleration, do not average down"),
    (WeakDown, Consolidation, 0.0, "stabilizing, await confirmation"),
    (StrongDown, Consolidation, 0.0, "stabilizing, await reversal confirmation"),
    (WeakUp, WeakDown, 0.0, "whipsaw, stay flat"),
    (WeakDown, WeakUp, 0.0, "whipsaw, stay flat"),
];

pub fn persistence_rule(state: TrendState) -> Option<(f64, &'static str)> {
    PERSISTENCE_RULES
        .iter()
        .find(|(s, _, _)| *s == state)
        .map(|&(_, ratio, rationale)| (ratio, rationale))
}

pub fn transition_rule(prev: TrendState, curr: TrendState) -> Option<(f64, &'static str)> {
    TRANSITION_RULES
        .iter()
        .find(|(p, c, _, _)| *p == prev && *c == curr)
        .map(|&(_, _, ratio, rationale)| (ratio, rationale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn no_duplicate_keys() {
        let pairs: HashSet<_> = TRANSITION_RULES.iter().map(|(p, c, _, _)| (*p, *c)).collect();
        assert_eq!(pairs.len(), TRANSITION_RULES.len());
        let states: HashSet<_> = PERSISTENCE_RULES.iter().map(|(s, _, _)| *s).collect();
        assert_eq!(states.len(), PERSISTENCE_RULES.len());
    }

    #[test]
    fn transitions_always_change_regime() {
        for (prev, curr, _, _) in TRANSITION_RULES {
            assert_ne!(prev, curr);
        }
    }

    #[test]
    fn lookups() {
        assert_eq!(transition_rule(WeakDown, StrongDown).map(|r| r.0), Some(-4.0));
        assert_eq!(transition_rule(StrongUp, StrongDown), None);
        assert_eq!(persistence_rule(Consolidation), None);
        assert_eq!(persistence_rule(StrongDown).map(|r| r.0), Some(-2.0));
    }
}
