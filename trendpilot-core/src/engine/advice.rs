//! Advise-mode outputs: recommendation text and indicator summary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decision::Directive;
use crate::features::BarView;
use crate::regime::{OscillatorState, TrendState, VolumeState};

use super::entry::EntryScore;

/// Snapshot of the indicators behind an advice, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub close: f64,
    pub sma_short: f64,
    pub sma_mid: f64,
    pub sma_long: f64,
    pub adx: f64,
    pub momentum: f64,
    pub prev_trend: TrendState,
    pub trend: TrendState,
    pub rsi: f64,
    pub stoch_j: f64,
    pub bb_mid: f64,
    pub bb_top: f64,
    pub bb_bottom: f64,
    pub oscillator: OscillatorState,
    pub volume: f64,
    pub volume_avg: f64,
    pub volume_ratio: f64,
    pub volume_state: VolumeState,
}

impl IndicatorSummary {
    pub fn of(view: &BarView<'_>, prev_trend: TrendState, trend: TrendState) -> Self {
        let f = view.current();
        Self {
            close: f.close,
            sma_short: f.sma_short,
            sma_mid: f.sma_mid,
            sma_long: f.sma_long,
            adx: f.adx,
            momentum: f.momentum,
            prev_trend,
            trend,
            rsi: f.rsi,
            stoch_j: f.stoch_j,
            bb_mid: f.bb_mid,
            bb_top: f.bb_top,
            bb_bottom: f.bb_bottom,
            oscillator: OscillatorState::of(f),
            volume: f.volume,
            volume_avg: f.volume_avg,
            volume_ratio: f.volume_ratio,
            volume_state: VolumeState::classify(view),
        }
    }
}

impl std::fmt::Display for IndicatorSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "MA5={:.4}, MA10={:.4}, MA20={:.4}, CLOSE={:.4}, ADX={:.4}, MOM={:.4}",
            self.sma_short, self.sma_mid, self.sma_long, self.close, self.adx, self.momentum
        )?;
        writeln!(
            f,
            "trend: {} -> {}",
            self.prev_trend.code(),
            self.trend.code()
        )?;
        writeln!(
            f,
            "RSI={:.4}, J={:.4}, BOLL: {:.4}/{:.4}/{:.4}, state: {}",
            self.rsi, self.stoch_j, self.bb_mid, self.bb_top, self.bb_bottom, self.oscillator
        )?;
        write!(
            f,
            "VOL={:.0}, VMA={:.0}, volume ratio: {:.2}%, state: {}",
            self.volume,
            self.volume_avg,
            self.volume_ratio * 100.0,
            self.volume_state
        )
    }
}

/// Recommendation for the last bar of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    /// Forecast change applied to build the last bar, if any.
    pub forecast_change: Option<f64>,
    pub directive: Directive,
    pub entry: EntryScore,
    /// Cash the entry score would commit on a fresh position.
    pub entry_suggestion: f64,
    pub text: String,
    pub summary: IndicatorSummary,
}

impl std::fmt::Display for Advice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(change) = self.forecast_change {
            writeln!(
                f,
                "forecast close: {:.4} ({:+.2}%)",
                self.close,
                change * 100.0
            )?;
        }
        write!(f, "{} advice: {}", self.date, self.text)
    }
}
