//! MACD: EMA(fast) - EMA(slow), its EMA signal line and the histogram.
//!
//! Lookback: slow - 1 for the MACD line, slow + signal - 2 for signal and
//! histogram.

use crate::domain::Bar;
use crate::features::Indicator;

use super::closes;
use super::ema::ema_of_series;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Line,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    fn with_line(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(slow > fast, "MACD slow period must exceed fast period");
        let label = match line {
            MacdLine::Line => "line",
            MacdLine::Signal => "signal",
            MacdLine::Histogram => "hist",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_line(fast, slow, signal, MacdLine::Line)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_line(fast, slow, signal, MacdLine::Signal)
    }

    pub fn histogram(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_line(fast, slow, signal, MacdLine::Histogram)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            MacdLine::Line => self.slow - 1,
            MacdLine::Signal | MacdLine::Histogram => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let values = closes(bars);
        let fast = ema_of_series(&values, self.fast);
        let slow = ema_of_series(&values, self.slow);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        if self.line == MacdLine::Line {
            return line;
        }

        let signal = ema_of_series(&line, self.signal);
        match self.line {
            MacdLine::Signal => signal,
            _ => line.iter().zip(&signal).map(|(l, s)| l - s).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    fn rising(n: usize) -> Vec<Bar> {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        make_bars(&closes)
    }

    #[test]
    fn first_valid_matches_lookback() {
        let bars = rising(60);
        for macd in [
            Macd::line(12, 26, 9),
            Macd::signal(12, 26, 9),
            Macd::histogram(12, 26, 9),
        ] {
            let values = macd.compute(&bars);
            let first = values.iter().position(|v| !v.is_nan()).unwrap();
            assert_eq!(first, macd.lookback(), "{}", macd.name());
        }
    }

    #[test]
    fn uptrend_line_positive() {
        let bars = rising(60);
        let line = Macd::line(12, 26, 9).compute(&bars);
        assert!(line[59] > 0.0);
    }

    #[test]
    fn histogram_is_line_minus_signal() {
        let bars = rising(60);
        let line = Macd::line(12, 26, 9).compute(&bars);
        let signal = Macd::signal(12, 26, 9).compute(&bars);
        let hist = Macd::histogram(12, 26, 9).compute(&bars);
        for i in 33..60 {
            assert_approx(hist[i], line[i] - signal[i], DEFAULT_EPSILON);
        }
    }
}
