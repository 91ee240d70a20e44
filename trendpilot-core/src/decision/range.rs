//! Range-market micro-decision: buy support, trim resistance.
//!
//! Only acts while the upper band is flat relative to ATR and volume shows
//! neither a dump nor a breakout.

use crate::features::BarView;
use crate::regime::{is_overbought, is_oversold};

use super::Directive;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeDecider {
    /// Bars back for the upper-band slope.
    pub band_slope_lookback: usize,
    /// Max band slope as a fraction of ATR for the band to be flat.
    pub flat_band_atr: f64,
    /// Max volume / average for a support buy.
    pub dump_volume_factor: f64,
    /// Max volume / average for a resistance trim.
    pub breakout_volume_factor: f64,
}

impl Default for RangeDecider {
    fn default() -> Self {
        Self {
            band_slope_lookback: 3,
            flat_band_atr: 0.2,
            dump_volume_factor: 1.2,
            breakout_volume_factor: 1.3,
        }
    }
}

impl RangeDecider {
    pub fn decide(&self, view: &BarView<'_>) -> Directive {
        let f = view.current();
        let flat_band = view
            .lag(self.band_slope_lookback)
            .is_some_and(|p| (f.bb_top - p.bb_top).abs() < self.flat_band_atr * f.atr);
        let no_volume_dump = f.volume <= f.volume_avg * self.dump_volume_factor;
        let no_volume_breakout = f.volume <= f.volume_avg * self.breakout_volume_factor;

        let low_buy = (f.close <= f.bb_bottom || is_oversold(f)) && flat_band && no_volume_dump;
        let high_sell =
            (f.close >= f.bb_top || is_overbought(f)) && flat_band && no_volume_breakout;

        if low_buy {
            Directive::new(1.0, "range market, accumulate at support")
        } else if high_sell {
            Directive::new(-1.0, "range market, trim at resistance")
        } else {
            Directive::hold("range market, no actionable level")
        }
    }
}
