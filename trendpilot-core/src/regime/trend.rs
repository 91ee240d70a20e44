//! Six-state trend classifier.
//!
//! Rules are an ordered table of `(predicate, label)` pairs. The first
//! predicate that holds names the regime; `Undetermined` is the fallback, so
//! every bar gets exactly one label.

use serde::{Deserialize, Serialize};

use crate::features::FeatureSet;

/// Discrete market regime of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendState {
    StrongUp,
    WeakUp,
    Consolidation,
    StrongDown,
    WeakDown,
    Undetermined,
}

impl TrendState {
    pub const ALL: [TrendState; 6] = [
        TrendState::StrongUp,
        TrendState::WeakUp,
        TrendState::Consolidation,
        TrendState::StrongDown,
        TrendState::WeakDown,
        TrendState::Undetermined,
    ];

    /// Two-letter code used in traces and summaries.
    pub fn code(self) -> &'static str {
        match self {
            TrendState::StrongUp => "SU",
            TrendState::WeakUp => "WU",
            TrendState::Consolidation => "CO",
            TrendState::StrongDown => "SD",
            TrendState::WeakDown => "WD",
            TrendState::Undetermined => "UT",
        }
    }
}

impl std::fmt::Display for TrendState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendState::StrongUp => write!(f, "StrongUp"),
            TrendState::WeakUp => write!(f, "WeakUp"),
            TrendState::Consolidation => write!(f, "Consolidation"),
            TrendState::StrongDown => write!(f, "StrongDown"),
            TrendState::WeakDown => write!(f, "WeakDown"),
            TrendState::Undetermined => write!(f, "Undetermined"),
        }
    }
}

/// ADX above this marks a strong trend.
pub const STRONG_TREND_ADX: f64 = 25.0;
/// ADX below this marks a range.
pub const RANGE_ADX: f64 = 20.0;
/// Volatility below this fraction of its trailing average marks a range.
pub const LOW_VOLATILITY_FACTOR: f64 = 0.8;

type Rule = fn(&FeatureSet, &RegimeClassifier) -> bool;

const RULES: [(Rule, TrendState); 5] = [
    (strong_up, TrendState::StrongUp),
    (weak_up, TrendState::WeakUp),
    (consolidation, TrendState::Consolidation),
    (strong_down, TrendState::StrongDown),
    (weak_down, TrendState::WeakDown),
];

/// Maps a feature set to a [`TrendState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeClassifier {
    /// Max |SMA5 - SMA10| / close for the moving averages to count as tangled.
    pub osc_band_tol: f64,
}

impl Default for RegimeClassifier {
    fn default() -> Self {
        Self { osc_band_tol: 0.02 }
    }
}

impl RegimeClassifier {
    pub fn new(osc_band_tol: f64) -> Self {
        Self { osc_band_tol }
    }

    pub fn classify(&self, f: &FeatureSet) -> TrendState {
        RULES
            .iter()
            .find(|(rule, _)| rule(f, self))
            .map(|&(_, state)| state)
            .unwrap_or(TrendState::Undetermined)
    }
}

fn ma_stacked_up(f: &FeatureSet) -> bool {
    f.sma_short > f.sma_mid && f.sma_mid > f.sma_long
}

fn ma_stacked_down(f: &FeatureSet) -> bool {
    f.sma_short < f.sma_mid && f.sma_mid < f.sma_long
}

fn ema_stacked_up(f: &FeatureSet) -> bool {
    f.ema_fast > f.ema_medium && f.ema_medium > f.ema_slow
}

fn ema_stacked_down(f: &FeatureSet) -> bool {
    f.ema_fast < f.ema_medium && f.ema_medium < f.ema_slow
}

fn strong_up(f: &FeatureSet, _: &RegimeClassifier) -> bool {
    ma_stacked_up(f)
        && ema_stacked_up(f)
        && f.close > f.sma_short
        && f.adx > STRONG_TREND_ADX
        && f.momentum > 0.0
}

fn weak_up(f: &FeatureSet, _: &RegimeClassifier) -> bool {
    ma_stacked_up(f) && f.close > f.sma_mid && f.momentum > 0.0
}

fn consolidation(f: &FeatureSet, c: &RegimeClassifier) -> bool {
    let low_adx = f.adx < RANGE_ADX;
    let tangled = (f.sma_short - f.sma_mid).abs() / f.close < c.osc_band_tol;
    let quiet = f.stddev < LOW_VOLATILITY_FACTOR * f.stddev_avg;
    low_adx || tangled || quiet
}

fn strong_down(f: &FeatureSet, _: &RegimeClassifier) -> bool {
    ma_stacked_down(f)
        && ema_stacked_down(f)
        && f.close < f.sma_mid
        && f.adx > STRONG_TREND_ADX
        && f.momentum < 0.0
}

fn weak_down(f: &FeatureSet, _: &RegimeClassifier) -> bool {
    ma_stacked_down(f) && f.close < f.sma_short && f.momentum < 0.0
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Feature set that matches no rule: flat MAs far apart relative to a
    /// tiny tolerance, mid-range ADX, steady volatility.
    pub(crate) fn neutral() -> FeatureSet {
        FeatureSet {
            close: 100.0,
            volume: 1000.0,
            sma_short: 100.0,
            sma_mid: 96.0,
            sma_long: 100.0,
            ema_fast: 100.0,
            ema_medium: 100.0,
            ema_slow: 100.0,
            bb_mid: 100.0,
            bb_top: 106.0,
            bb_bottom: 94.0,
            macd: 0.0,
            macd_signal: 0.0,
            macd_hist: 0.0,
            rsi: 50.0,
            atr: 2.0,
            stoch_k: 50.0,
            stoch_d: 50.0,
            stoch_j: 50.0,
            adx: 22.0,
            plus_di: 20.0,
            minus_di: 20.0,
            momentum: 0.0,
            stddev: 2.0,
            stddev_avg: 2.0,
            volume_avg: 1000.0,
            volume_ratio: 1.0,
        }
    }

    pub(crate) fn strong_up_features() -> FeatureSet {
        FeatureSet {
            close: 112.0,
            sma_short: 110.0,
            sma_mid: 105.0,
            sma_long: 100.0,
            ema_fast: 109.0,
            ema_medium: 104.0,
            ema_slow: 99.0,
            adx: 30.0,
            momentum: 5.0,
            ..neutral()
        }
    }

    pub(crate) fn strong_down_features() -> FeatureSet {
        FeatureSet {
            close: 88.0,
            sma_short: 90.0,
            sma_mid: 95.0,
            sma_long: 100.0,
            ema_fast: 91.0,
            ema_medium: 96.0,
            ema_slow: 101.0,
            adx: 30.0,
            momentum: -5.0,
            ..neutral()
        }
    }

    #[test]
    fn neutral_is_undetermined() {
        assert_eq!(
            RegimeClassifier::default().classify(&neutral()),
            TrendState::Undetermined
        );
    }

    #[test]
    fn strong_up_stack() {
        let c = RegimeClassifier::default();
        assert_eq!(c.classify(&strong_up_features()), TrendState::StrongUp);
    }

    #[test]
    fn weak_up_when_adx_soft() {
        let f = FeatureSet {
            adx: 23.0,
            ..strong_up_features()
        };
        assert_eq!(RegimeClassifier::default().classify(&f), TrendState::WeakUp);
    }

    #[test]
    fn strong_down_and_weak_down() {
        let c = RegimeClassifier::default();
        assert_eq!(c.classify(&strong_down_features()), TrendState::StrongDown);
        let weak = FeatureSet {
            adx: 23.0,
            ..strong_down_features()
        };
        assert_eq!(c.classify(&weak), TrendState::WeakDown);
    }

    #[test]
    fn up_rules_take_priority_over_consolidation() {
        // tangled MAs would also satisfy the range rule
        let f = FeatureSet {
            sma_short: 110.0,
            sma_mid: 109.5,
            sma_long: 100.0,
            ..strong_up_features()
        };
        assert_eq!(RegimeClassifier::default().classify(&f), TrendState::StrongUp);
    }

    #[test]
    fn consolidation_beats_down_rules() {
        let f = FeatureSet {
            adx: 15.0,
            ..strong_down_features()
        };
        assert_eq!(
            RegimeClassifier::default().classify(&f),
            TrendState::Consolidation
        );
    }

    #[test]
    fn each_consolidation_trigger() {
        let c = RegimeClassifier::default();
        let low_adx = FeatureSet {
            adx: 19.0,
            ..neutral()
        };
        let tangled = FeatureSet {
            sma_mid: 99.0,
            ..neutral()
        };
        let quiet = FeatureSet {
            stddev: 1.0,
            ..neutral()
        };
        for f in [low_adx, tangled, quiet] {
            assert_eq!(c.classify(&f), TrendState::Consolidation);
        }
    }

    #[test]
    fn band_tolerance_is_configurable() {
        let f = FeatureSet {
            sma_mid: 99.0,
            ..neutral()
        };
        assert_eq!(
            RegimeClassifier::new(0.005).classify(&f),
            TrendState::Undetermined
        );
    }

    #[test]
    fn missing_features_never_match() {
        let f = FeatureSet {
            adx: f64::NAN,
            sma_short: f64::NAN,
            stddev_avg: f64::NAN,
            ..neutral()
        };
        assert_eq!(
            RegimeClassifier::default().classify(&f),
            TrendState::Undetermined
        );
    }

    #[test]
    fn codes_are_distinct() {
        let mut codes: Vec<_> = TrendState::ALL.iter().map(|s| s.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 6);
    }
}
