//! Slow stochastic oscillator with the derived J line.
//!
//! raw %K = 100 * (close - lowest low) / (highest high - lowest low) over `period`
//! (50 when the range is zero). %K = SMA(raw %K, k_smooth),
//! %D = SMA(%K, d_smooth), J = 3K - 2D.

use crate::domain::Bar;
use crate::features::Indicator;

use super::sma::sma_of_series;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
    J,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    period: usize,
    k_smooth: usize,
    d_smooth: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    pub fn new(period: usize, k_smooth: usize, d_smooth: usize, line: StochasticLine) -> Self {
        assert!(
            period >= 1 && k_smooth >= 1 && d_smooth >= 1,
            "stochastic periods must be >= 1"
        );
        let label = match line {
            StochasticLine::K => "k",
            StochasticLine::D => "d",
            StochasticLine::J => "j",
        };
        Self {
            period,
            k_smooth,
            d_smooth,
            line,
            name: format!("stoch_{label}_{period}_{k_smooth}_{d_smooth}"),
        }
    }

    fn raw_k(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut raw = vec![f64::NAN; n];
        if n < self.period {
            return raw;
        }
        for i in (self.period - 1)..n {
            let window = &bars[i + 1 - self.period..=i];
            let highest = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
            let range = highest - lowest;
            raw[i] = if range > 0.0 {
                100.0 * (bars[i].close - lowest) / range
            } else {
                50.0
            };
        }
        raw
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let k = self.period + self.k_smooth - 2;
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D | StochasticLine::J => k + self.d_smooth - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let k = sma_of_series(&self.raw_k(bars), self.k_smooth);
        if self.line == StochasticLine::K {
            return k;
        }
        let d = sma_of_series(&k, self.d_smooth);
        match self.line {
            StochasticLine::D => d,
            _ => k.iter().zip(&d).map(|(k, d)| 3.0 * k - 2.0 * d).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn k_in_range_and_lookback() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let bars = make_bars(&closes);
        for line in [StochasticLine::K, StochasticLine::D] {
            let stoch = Stochastic::new(14, 3, 3, line);
            let values = stoch.compute(&bars);
            let first = values.iter().position(|v| !v.is_nan()).unwrap();
            assert_eq!(first, stoch.lookback());
            for v in values.iter().filter(|v| !v.is_nan()) {
                assert!((0.0..=100.0).contains(v));
            }
        }
    }

    #[test]
    fn close_at_high_gives_100() {
        // close equals the window high every bar
        let data: Vec<_> = (0..10)
            .map(|i| {
                let c = 10.0 + i as f64;
                (c - 0.5, c, c - 1.0, c)
            })
            .collect();
        let bars = make_ohlc_bars(&data);
        let k = Stochastic::new(3, 1, 1, StochasticLine::K).compute(&bars);
        assert_approx(k[9], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn j_is_3k_minus_2d() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + (i % 7) as f64).collect();
        let bars = make_bars(&closes);
        let k = Stochastic::new(14, 3, 3, StochasticLine::K).compute(&bars);
        let d = Stochastic::new(14, 3, 3, StochasticLine::D).compute(&bars);
        let j = Stochastic::new(14, 3, 3, StochasticLine::J).compute(&bars);
        for i in 17..40 {
            assert_approx(j[i], 3.0 * k[i] - 2.0 * d[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn flat_range_is_neutral() {
        let bars = make_ohlc_bars(&[(5.0, 5.0, 5.0, 5.0); 6]);
        let k = Stochastic::new(3, 1, 1, StochasticLine::K).compute(&bars);
        assert_approx(k[5], 50.0, DEFAULT_EPSILON);
    }
}
