//! Volume average and volume ratio.
//!
//! ratio[t] = volume[t] / SMA(volume, period)[t], defined as 0 when the
//! average is 0 (NAV series without traded volume).

use crate::domain::Bar;
use crate::features::Indicator;

use super::sma::sma_of_series;

fn volumes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume).collect()
}

#[derive(Debug, Clone)]
pub struct VolumeSma {
    period: usize,
    name: String,
}

impl VolumeSma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "volume SMA period must be >= 1");
        Self {
            period,
            name: format!("volume_sma_{period}"),
        }
    }
}

impl Indicator for VolumeSma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        sma_of_series(&volumes(bars), self.period)
    }
}

#[derive(Debug, Clone)]
pub struct VolumeRatio {
    period: usize,
    name: String,
}

impl VolumeRatio {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "volume ratio period must be >= 1");
        Self {
            period,
            name: format!("volume_ratio_{period}"),
        }
    }
}

impl Indicator for VolumeRatio {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let avg = sma_of_series(&volumes(bars), self.period);
        bars.iter()
            .zip(&avg)
            .map(|(bar, &avg)| {
                if avg.is_nan() {
                    f64::NAN
                } else if avg == 0.0 {
                    0.0
                } else {
                    bar.volume / avg
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ratio_against_average() {
        let mut bars = make_bars(&[1.0, 1.0, 1.0, 1.0]);
        for (bar, v) in bars.iter_mut().zip([100.0, 100.0, 100.0, 300.0]) {
            bar.volume = v;
        }
        let avg = VolumeSma::new(4).compute(&bars);
        let ratio = VolumeRatio::new(4).compute(&bars);
        assert_approx(avg[3], 150.0, DEFAULT_EPSILON);
        assert_approx(ratio[3], 2.0, DEFAULT_EPSILON);
        assert!(ratio[2].is_nan());
    }

    #[test]
    fn zero_average_gives_zero_ratio() {
        let mut bars = make_bars(&[1.0, 1.1, 1.2]);
        for bar in &mut bars {
            bar.volume = 0.0;
        }
        let ratio = VolumeRatio::new(2).compute(&bars);
        assert_eq!(ratio[2], 0.0);
    }
}
