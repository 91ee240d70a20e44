//! Bollinger Bands: SMA(close) plus/minus a multiple of the population stddev.
//!
//! One instance per band. Lookback: period - 1.

use crate::domain::Bar;
use crate::features::Indicator;

use super::closes;
use super::sma::sma_of_series;
use super::stddev::stddev_of_series;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Top,
    Mid,
    Bottom,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    fn with_band(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        let label = match band {
            BollingerBand::Top => "top",
            BollingerBand::Mid => "mid",
            BollingerBand::Bottom => "bot",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bollinger_{label}_{period}_{multiplier}"),
        }
    }

    pub fn top(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Top)
    }

    pub fn mid(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Mid)
    }

    pub fn bottom(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Bottom)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let values = closes(bars);
        let mid = sma_of_series(&values, self.period);
        if self.band == BollingerBand::Mid {
            return mid;
        }
        let sign = if self.band == BollingerBand::Top { 1.0 } else { -1.0 };
        let stddev = stddev_of_series(&values, self.period);
        mid.iter()
            .zip(&stddev)
            .map(|(m, sd)| m + sign * self.multiplier * sd)
            .collect()
    }
}
