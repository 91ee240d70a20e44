//! Exponential Moving Average (EMA) of close.
//!
//! EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (period + 1).
//! The recursion starts from the first available value; outputs before
//! `period - 1` bars of history are reported as NaN.
//! Lookback: period - 1.

use crate::domain::Bar;
use crate::features::Indicator;

use super::closes;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        ema_of_series(&closes(bars), self.period)
    }
}

/// EMA over an arbitrary series.
///
/// Leading NaNs are skipped; the first finite value seeds the recursion. A NaN
/// after the seed taints every later value.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }

    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };

    let alpha = 2.0 / (period as f64 + 1.0);
    let first_reported = start + period - 1;
    let mut prev = values[start];
    if first_reported == start {
        result[start] = prev;
    }

    for i in (start + 1)..n {
        if values[i].is_nan() {
            break;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        if i >= first_reported {
            result[i] = prev;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn period_1_equals_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&bars);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn seeded_from_first_value() {
        // alpha = 0.5, seed 10
        // t1: 10.5, t2: 11.25, t3: 12.125
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        let result = Ema::new(3).compute(&bars);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
        assert_approx(result[3], 12.125, DEFAULT_EPSILON);
    }

    #[test]
    fn leading_nan_shifts_seed() {
        let values = [f64::NAN, f64::NAN, 4.0, 6.0, 8.0];
        let result = ema_of_series(&values, 2);
        // alpha = 2/3, seed at index 2 = 4.0, first reported at index 3
        assert!(result[2].is_nan());
        assert_approx(result[3], 4.0 + (6.0 - 4.0) * 2.0 / 3.0, DEFAULT_EPSILON);
        assert!(!result[4].is_nan());
    }

    #[test]
    fn nan_after_seed_taints_rest() {
        let values = [1.0, 2.0, f64::NAN, 4.0];
        let result = ema_of_series(&values, 1);
        assert_approx(result[1], 2.0, DEFAULT_EPSILON);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
    }

    #[test]
    fn constant_series_is_constant() {
        let bars = make_bars(&[5.0; 30]);
        let result = Ema::new(9).compute(&bars);
        for v in &result[8..] {
            assert_approx(*v, 5.0, DEFAULT_EPSILON);
        }
    }
}
