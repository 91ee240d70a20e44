//! Volume/price relationship of the current bar.

use serde::{Deserialize, Serialize};

use crate::features::BarView;

const DIVERGENCE_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeState {
    /// Volume above twice its average on a rising close.
    Breakout,
    /// Volume below half its average.
    Shrinking,
    /// New 5-bar low on heavy volume.
    BullishDivergence,
    /// New 5-bar high on thin volume.
    BearishDivergence,
    Normal,
}

impl VolumeState {
    /// First match wins, in declaration order.
    pub fn classify(view: &BarView<'_>) -> Self {
        let f = view.current();
        let ratio = f.volume_ratio;

        let rising = view.lag(1).is_some_and(|p| f.close > p.close);
        if ratio > 2.0 && rising {
            return VolumeState::Breakout;
        }
        if ratio > 0.0 && ratio < 0.5 {
            return VolumeState::Shrinking;
        }

        if let Some(prior) = view.prior_closes(DIVERGENCE_WINDOW) {
            let low = prior.iter().copied().fold(f64::INFINITY, f64::min);
            let high = prior.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if f.close < low && ratio > 1.5 {
                return VolumeState::BullishDivergence;
            }
            if f.close > high && ratio > 0.0 && ratio < 0.7 {
                return VolumeState::BearishDivergence;
            }
        }
        VolumeState::Normal
    }
}

impl std::fmt::Display for VolumeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolumeState::Breakout => write!(f, "volume breakout"),
            VolumeState::Shrinking => write!(f, "shrinking volume"),
            VolumeState::BullishDivergence => write!(f, "bullish divergence"),
            VolumeState::BearishDivergence => write!(f, "bearish divergence"),
            VolumeState::Normal => write!(f, "normal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use crate::features::FeaturePipeline;
    use crate::indicators::make_bars;

    fn state_of_last(closes: &[f64], last_volume: f64) -> VolumeState {
        let mut bars: Vec<Bar> = make_bars(closes);
        bars.last_mut().unwrap().volume = last_volume;
        let frame = FeaturePipeline::standard().compute(&bars);
        let view = frame.view(bars.len() - 1).unwrap();
        VolumeState::classify(&view)
    }

    fn base() -> Vec<f64> {
        (0..30).map(|i| 100.0 + (i % 3) as f64).collect()
    }

    #[test]
    fn heavy_volume_up_close_is_breakout() {
        let mut closes = base();
        closes.push(110.0);
        assert_eq!(state_of_last(&closes, 4000.0), VolumeState::Breakout);
    }

    #[test]
    fn thin_volume_is_shrinking() {
        let mut closes = base();
        closes.push(101.0);
        assert_eq!(state_of_last(&closes, 200.0), VolumeState::Shrinking);
    }

    #[test]
    fn new_low_on_heavy_volume() {
        let mut closes = base();
        closes.push(90.0);
        assert_eq!(state_of_last(&closes, 2500.0), VolumeState::BullishDivergence);
    }

    #[test]
    fn new_high_on_thin_volume() {
        let mut closes = base();
        closes.push(110.0);
        assert_eq!(state_of_last(&closes, 600.0), VolumeState::BearishDivergence);
    }

    #[test]
    fn zero_volume_is_normal() {
        let mut bars = make_bars(&base());
        for bar in &mut bars {
            bar.volume = 0.0;
        }
        let frame = FeaturePipeline::standard().compute(&bars);
        let view = frame.view(29).unwrap();
        assert_eq!(VolumeState::classify(&view), VolumeState::Normal);
    }
}
