//! The fixed feature set computed for every bar of a series.
//!
//! The pipeline registers one named indicator per feature line, precomputes
//! all of them in one pass, then transposes the named series into one
//! [`FeatureSet`] per bar. Unavailable values are `f64::NAN`; every
//! comparison against NaN is false, so rules that depend on a missing
//! feature simply do not fire.

use serde::Serialize;

use crate::domain::Bar;
use crate::indicators::sma::sma_of_series;
use crate::indicators::{
    Atr, Bollinger, Dmi, Ema, Macd, Momentum, Rsi, Sma, StdDev, Stochastic, StochasticLine,
    VolumeRatio, VolumeSma,
};

use super::indicator::{compute_warmup, precompute_indicators, Indicator, IndicatorValues};

/// Window of the trailing average that rolling volatility is compared with.
pub const VOLATILITY_AVG_WINDOW: usize = 10;

/// Every feature of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSet {
    pub close: f64,
    pub volume: f64,
    pub sma_short: f64,
    pub sma_mid: f64,
    pub sma_long: f64,
    pub ema_fast: f64,
    pub ema_medium: f64,
    pub ema_slow: f64,
    pub bb_mid: f64,
    pub bb_top: f64,
    pub bb_bottom: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub rsi: f64,
    pub atr: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub stoch_j: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub momentum: f64,
    pub stddev: f64,
    /// Trailing average of `stddev`, current bar included.
    pub stddev_avg: f64,
    pub volume_avg: f64,
    pub volume_ratio: f64,
}

impl FeatureSet {
    pub fn bb_width(&self) -> f64 {
        self.bb_top - self.bb_bottom
    }
}

/// Indicator names backing each feature line.
#[derive(Debug, Clone, Default)]
struct FeatureKeys {
    sma_short: String,
    sma_mid: String,
    sma_long: String,
    ema_fast: String,
    ema_medium: String,
    ema_slow: String,
    bb_mid: String,
    bb_top: String,
    bb_bottom: String,
    macd: String,
    macd_signal: String,
    macd_hist: String,
    rsi: String,
    atr: String,
    stoch_k: String,
    stoch_d: String,
    stoch_j: String,
    adx: String,
    plus_di: String,
    minus_di: String,
    momentum: String,
    stddev: String,
    volume_avg: String,
    volume_ratio: String,
}

/// Builds the indicator set and turns a bar history into a [`FeatureFrame`].
pub struct FeaturePipeline {
    indicators: Vec<Box<dyn Indicator>>,
    keys: FeatureKeys,
}

impl FeaturePipeline {
    /// SMA 5/10/20, EMA 9/21/50, Bollinger(20, 2), MACD(12, 26, 9), RSI 14,
    /// ATR 14, stochastic (14, 3, 3), ADX/DI 14, momentum 10, stddev 10,
    /// volume average and ratio over 20 bars.
    pub fn standard() -> Self {
        let mut p = Self {
            indicators: Vec::new(),
            keys: FeatureKeys::default(),
        };
        p.keys.sma_short = p.register(Sma::new(5));
        p.keys.sma_mid = p.register(Sma::new(10));
        p.keys.sma_long = p.register(Sma::new(20));
        p.keys.ema_fast = p.register(Ema::new(9));
        p.keys.ema_medium = p.register(Ema::new(21));
        p.keys.ema_slow = p.register(Ema::new(50));
        p.keys.bb_mid = p.register(Bollinger::mid(20, 2.0));
        p.keys.bb_top = p.register(Bollinger::top(20, 2.0));
        p.keys.bb_bottom = p.register(Bollinger::bottom(20, 2.0));
        p.keys.macd = p.register(Macd::line(12, 26, 9));
        p.keys.macd_signal = p.register(Macd::signal(12, 26, 9));
        p.keys.macd_hist = p.register(Macd::histogram(12, 26, 9));
        p.keys.rsi = p.register(Rsi::new(14));
        p.keys.atr = p.register(Atr::new(14));
        p.keys.stoch_k = p.register(Stochastic::new(14, 3, 3, StochasticLine::K));
        p.keys.stoch_d = p.register(Stochastic::new(14, 3, 3, StochasticLine::D));
        p.keys.stoch_j = p.register(Stochastic::new(14, 3, 3, StochasticLine::J));
        p.keys.adx = p.register(Dmi::adx(14));
        p.keys.plus_di = p.register(Dmi::plus_di(14));
        p.keys.minus_di = p.register(Dmi::minus_di(14));
        p.keys.momentum = p.register(Momentum::new(10));
        p.keys.stddev = p.register(StdDev::new(10));
        p.keys.volume_avg = p.register(VolumeSma::new(20));
        p.keys.volume_ratio = p.register(VolumeRatio::new(20));
        p
    }

    fn register(&mut self, indicator: impl Indicator + 'static) -> String {
        let name = indicator.name().to_string();
        self.indicators.push(Box::new(indicator));
        name
    }

    pub fn indicators(&self) -> &[Box<dyn Indicator>] {
        &self.indicators
    }

    /// Bars that must pass before every feature is available.
    pub fn warmup(&self) -> usize {
        compute_warmup(&self.indicators)
    }

    pub fn compute(&self, bars: &[Bar]) -> FeatureFrame {
        let values = precompute_indicators(bars, &self.indicators);
        let stddev_avg = values
            .get_series(&self.keys.stddev)
            .map(|s| sma_of_series(s, VOLATILITY_AVG_WINDOW))
            .unwrap_or_else(|| vec![f64::NAN; bars.len()]);

        let k = &self.keys;
        let at = |name: &str, i: usize| values.value(name, i);
        let features = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| FeatureSet {
                close: bar.close,
                volume: bar.volume,
                sma_short: at(&k.sma_short, i),
                sma_mid: at(&k.sma_mid, i),
                sma_long: at(&k.sma_long, i),
                ema_fast: at(&k.ema_fast, i),
                ema_medium: at(&k.ema_medium, i),
                ema_slow: at(&k.ema_slow, i),
                bb_mid: at(&k.bb_mid, i),
                bb_top: at(&k.bb_top, i),
                bb_bottom: at(&k.bb_bottom, i),
                macd: at(&k.macd, i),
                macd_signal: at(&k.macd_signal, i),
                macd_hist: at(&k.macd_hist, i),
                rsi: at(&k.rsi, i),
                atr: at(&k.atr, i),
                stoch_k: at(&k.stoch_k, i),
                stoch_d: at(&k.stoch_d, i),
                stoch_j: at(&k.stoch_j, i),
                adx: at(&k.adx, i),
                plus_di: at(&k.plus_di, i),
                minus_di: at(&k.minus_di, i),
                momentum: at(&k.momentum, i),
                stddev: at(&k.stddev, i),
                stddev_avg: stddev_avg.get(i).copied().unwrap_or(f64::NAN),
                volume_avg: at(&k.volume_avg, i),
                volume_ratio: at(&k.volume_ratio, i),
            })
            .collect();

        FeatureFrame {
            features,
            warmup: self.warmup(),
            values,
        }
    }
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for FeaturePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.indicators.iter().map(|i| i.name()).collect();
        f.debug_struct("FeaturePipeline")
            .field("indicators", &names)
            .finish()
    }
}

/// Feature sets for a whole series, aligned with its bars.
#[derive(Debug, Clone)]
pub struct FeatureFrame {
    features: Vec<FeatureSet>,
    warmup: usize,
    values: IndicatorValues,
}

impl FeatureFrame {
    /// Frame over externally computed features, without raw indicator series.
    pub fn from_features(features: Vec<FeatureSet>, warmup: usize) -> Self {
        Self {
            features,
            warmup,
            values: IndicatorValues::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn warmup(&self) -> usize {
        self.warmup
    }

    /// True once every feature at `index` is past its warm-up.
    pub fn is_warm(&self, index: usize) -> bool {
        index >= self.warmup && index < self.features.len()
    }

    pub fn get(&self, index: usize) -> Option<&FeatureSet> {
        self.features.get(index)
    }

    pub fn features(&self) -> &[FeatureSet] {
        &self.features
    }

    /// Raw named indicator series.
    pub fn values(&self) -> &IndicatorValues {
        &self.values
    }

    pub fn view(&self, index: usize) -> Option<BarView<'_>> {
        (index < self.features.len()).then_some(BarView { frame: self, index })
    }
}

/// One bar of a frame, with access to earlier bars only.
#[derive(Debug, Clone, Copy)]
pub struct BarView<'a> {
    frame: &'a FeatureFrame,
    index: usize,
}

impl<'a> BarView<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &'a FeatureSet {
        &self.frame.features[self.index]
    }

    /// Features `n` bars back, `None` before the start of the series.
    pub fn lag(&self, n: usize) -> Option<&'a FeatureSet> {
        self.index
            .checked_sub(n)
            .and_then(|i| self.frame.features.get(i))
    }

    /// Closes of the `n` bars before this one, most recent first.
    pub fn prior_closes(&self, n: usize) -> Option<Vec<f64>> {
        (1..=n).map(|k| self.lag(k).map(|f| f.close)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn wave(n: usize) -> Vec<Bar> {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + i as f64 * 0.3 + (i as f64 * 0.5).sin() * 3.0)
            .collect();
        make_bars(&closes)
    }

    #[test]
    fn warmup_is_slow_ema() {
        assert_eq!(FeaturePipeline::standard().warmup(), 49);
    }

    #[test]
    fn all_features_available_after_warmup() {
        let bars = wave(80);
        let frame = FeaturePipeline::standard().compute(&bars);
        assert_eq!(frame.len(), 80);
        for i in frame.warmup()..frame.len() {
            let f = frame.get(i).unwrap();
            let json = serde_json::to_value(f).unwrap();
            for (name, v) in json.as_object().unwrap() {
                assert!(v.is_number(), "{name} unavailable at bar {i}");
            }
        }
    }

    #[test]
    fn unavailable_before_warmup() {
        let bars = wave(30);
        let frame = FeaturePipeline::standard().compute(&bars);
        let f = frame.get(29).unwrap();
        assert!(f.ema_slow.is_nan());
        assert!(!f.sma_long.is_nan());
        assert!(!frame.is_warm(29));
    }

    #[test]
    fn view_lags_stop_at_series_start() {
        let bars = wave(10);
        let frame = FeaturePipeline::standard().compute(&bars);
        let view = frame.view(3).unwrap();
        assert_eq!(view.lag(3).unwrap().close, bars[0].close);
        assert!(view.lag(4).is_none());
        assert!(view.prior_closes(5).is_none());
        assert_eq!(view.prior_closes(2).unwrap(), vec![bars[2].close, bars[1].close]);
        assert!(frame.view(10).is_none());
    }

    #[test]
    fn volatility_average_includes_current_bar() {
        let bars = wave(60);
        let frame = FeaturePipeline::standard().compute(&bars);
        let expected: f64 = (50..60).map(|i| frame.get(i).unwrap().stddev).sum::<f64>() / 10.0;
        assert!((frame.get(59).unwrap().stddev_avg - expected).abs() < 1e-9);
    }
}
