//! Breakout anticipation for range-bound bars.
//!
//! Five independent signals compare the current bar with a short lookback.
//! A breakout is considered likely when at least two of them hold. Signals
//! whose lookback bar does not exist yet are false.

use serde::Serialize;

use crate::features::BarView;

/// Tunables of the anticipator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakoutAnticipator {
    pub band_lookback: usize,
    pub band_opening_factor: f64,
    pub atr_lookback: usize,
    pub atr_rising_factor: f64,
    pub adx_lookback: usize,
    pub adx_rising_delta: f64,
    pub volume_factor: f64,
    pub min_signals: usize,
}

impl Default for BreakoutAnticipator {
    fn default() -> Self {
        Self {
            band_lookback: 5,
            band_opening_factor: 1.15,
            atr_lookback: 3,
            atr_rising_factor: 1.10,
            adx_lookback: 3,
            adx_rising_delta: 2.0,
            volume_factor: 1.3,
            min_signals: 2,
        }
    }
}

/// Individual signal outcomes for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BreakoutSignals {
    pub band_opening: bool,
    pub atr_rising: bool,
    pub adx_rising: bool,
    pub ma_break: bool,
    pub volume_rising: bool,
}

impl BreakoutSignals {
    pub fn count(&self) -> usize {
        [
            self.band_opening,
            self.atr_rising,
            self.adx_rising,
            self.ma_break,
            self.volume_rising,
        ]
        .iter()
        .filter(|&&s| s)
        .count()
    }
}

impl BreakoutAnticipator {
    pub fn signals(&self, view: &BarView<'_>) -> BreakoutSignals {
        let f = view.current();
        let band_opening = view
            .lag(self.band_lookback)
            .is_some_and(|p| f.bb_width() > p.bb_width() * self.band_opening_factor);
        let atr_rising = view
            .lag(self.atr_lookback)
            .is_some_and(|p| f.atr > p.atr * self.atr_rising_factor);
        let adx_rising = view
            .lag(self.adx_lookback)
            .is_some_and(|p| f.adx > p.adx + self.adx_rising_delta);
        let ma_break = (f.close > f.sma_short && f.sma_short > f.sma_mid)
            || (f.close < f.sma_short && f.sma_short < f.sma_mid);
        let volume_rising = f.volume > f.volume_avg * self.volume_factor;

        BreakoutSignals {
            band_opening,
            atr_rising,
            adx_rising,
            ma_break,
            volume_rising,
        }
    }

    pub fn breakout_likely(&self, view: &BarView<'_>) -> bool {
        self.signals(view).count() >= self.min_signals
    }
}
