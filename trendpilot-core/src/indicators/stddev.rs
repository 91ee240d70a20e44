//! Rolling population standard deviation of close.
//!
//! Lookback: period - 1.

use crate::domain::Bar;
use crate::features::Indicator;

use super::closes;

#[derive(Debug, Clone)]
pub struct StdDev {
    period: usize,
    name: String,
}

impl StdDev {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "StdDev period must be >= 1");
        Self {
            period,
            name: format!("stddev_{period}"),
        }
    }
}

impl Indicator for StdDev {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        stddev_of_series(&closes(bars), self.period)
    }
}

/// Trailing population standard deviation (divide by N).
pub fn stddev_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
        result[i] = variance.sqrt();
    }
    result
}
