//! Indicator trait and precomputed indicator values container.
//!
//! Indicators are pure functions: bar history in, numeric series out. They are
//! computed once per run, before the bar-by-bar loop, and looked up by name.

use crate::domain::Bar;
use std::collections::HashMap;

/// Trait for indicators.
///
/// Output has the same length as the input bars. Values that are not yet
/// available (warm-up) or cannot be computed are `f64::NAN`.
///
/// # Look-ahead guard
/// No value at bar t may depend on bars after t. Every indicator must give the
/// same values on a truncated series as on the full series.
pub trait Indicator: Send + Sync {
    /// Unique name (e.g., "sma_5", "macd_signal_12_26_9").
    fn name(&self) -> &str;

    /// Number of leading bars that are always NaN.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Named indicator series for one instrument.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Value at `bar_index`, `None` if the series or the index is missing.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    /// Value at `bar_index`, NaN when missing.
    pub fn value(&self, name: &str, bar_index: usize) -> f64 {
        self.get(name, bar_index).unwrap_or(f64::NAN)
    }

    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Compute every indicator over `bars` into one container.
pub fn precompute_indicators(bars: &[Bar], indicators: &[Box<dyn Indicator>]) -> IndicatorValues {
    let mut values = IndicatorValues::new();
    for indicator in indicators {
        let series = indicator.compute(bars);
        debug_assert_eq!(
            series.len(),
            bars.len(),
            "indicator '{}' produced {} values for {} bars",
            indicator.name(),
            series.len(),
            bars.len()
        );
        values.insert(indicator.name(), series);
    }
    values
}

/// Warm-up length: the maximum lookback across all indicators.
pub fn compute_warmup(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0)
}
