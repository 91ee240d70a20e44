//! Directional movement (Wilder): ADX, +DI, -DI.
//!
//! 1. +DM / -DM from consecutive highs and lows
//! 2. Wilder-smooth +DM, -DM and true range
//! 3. +DI = 100 * sm(+DM) / sm(TR), -DI = 100 * sm(-DM) / sm(TR)
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! A zero smoothed range (perfectly flat prices) gives DI = 0 and DX = 0.
//! Lookback: period for the DI lines, 2 * period - 1 for ADX.

use crate::domain::Bar;
use crate::features::Indicator;
use crate::indicators::atr::{true_range, wilder_smooth};

/// Which directional-movement line to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmiLine {
    Adx,
    PlusDi,
    MinusDi,
}

#[derive(Debug, Clone)]
pub struct Dmi {
    period: usize,
    line: DmiLine,
    name: String,
}

impl Dmi {
    fn with_line(period: usize, line: DmiLine) -> Self {
        assert!(period >= 1, "DMI period must be >= 1");
        let prefix = match line {
            DmiLine::Adx => "adx",
            DmiLine::PlusDi => "plus_di",
            DmiLine::MinusDi => "minus_di",
        };
        Self {
            period,
            line,
            name: format!("{prefix}_{period}"),
        }
    }

    pub fn adx(period: usize) -> Self {
        Self::with_line(period, DmiLine::Adx)
    }

    pub fn plus_di(period: usize) -> Self {
        Self::with_line(period, DmiLine::PlusDi)
    }

    pub fn minus_di(period: usize) -> Self {
        Self::with_line(period, DmiLine::MinusDi)
    }
}

/// Raw +DM and -DM. Index 0 is NaN.
fn directional_movement(bars: &[Bar]) -> (Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];
    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }
    (plus_dm, minus_dm)
}

fn directional_index(smoothed_dm: f64, smoothed_tr: f64) -> f64 {
    if smoothed_dm.is_nan() || smoothed_tr.is_nan() {
        f64::NAN
    } else if smoothed_tr == 0.0 {
        0.0
    } else {
        100.0 * smoothed_dm / smoothed_tr
    }
}

impl Indicator for Dmi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            DmiLine::Adx => 2 * self.period - 1,
            DmiLine::PlusDi | DmiLine::MinusDi => self.period,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let (plus_dm, minus_dm) = directional_movement(bars);
        let smooth_tr = wilder_smooth(&true_range(bars), self.period);
        let smooth_plus = wilder_smooth(&plus_dm, self.period);
        let smooth_minus = wilder_smooth(&minus_dm, self.period);

        let plus_di: Vec<f64> = (0..n)
            .map(|i| directional_index(smooth_plus[i], smooth_tr[i]))
            .collect();
        let minus_di: Vec<f64> = (0..n)
            .map(|i| directional_index(smooth_minus[i], smooth_tr[i]))
            .collect();

        match self.line {
            DmiLine::PlusDi => plus_di,
            DmiLine::MinusDi => minus_di,
            DmiLine::Adx => {
                let dx: Vec<f64> = plus_di
                    .iter()
                    .zip(&minus_di)
                    .map(|(&p, &m)| {
                        if p.is_nan() || m.is_nan() {
                            f64::NAN
                        } else if p + m == 0.0 {
                            0.0
                        } else {
                            100.0 * (p - m).abs() / (p + m)
                        }
                    })
                    .collect();
                wilder_smooth(&dx, self.period)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    fn trending_bars(n: usize, step: f64) -> Vec<Bar> {
        let data: Vec<_> = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * step;
                (base - 1.0, base + 3.0, base - 3.0, base + 2.0)
            })
            .collect();
        make_ohlc_bars(&data)
    }

    #[test]
    fn adx_bounded() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0),
            (106.0, 107.0, 98.0, 99.0),
            (99.0, 103.0, 97.0, 101.0),
            (101.0, 106.0, 100.0, 105.0),
            (105.0, 110.0, 103.0, 108.0),
            (108.0, 112.0, 106.0, 110.0),
            (110.0, 111.0, 104.0, 105.0),
            (105.0, 109.0, 103.0, 107.0),
            (107.0, 113.0, 105.0, 112.0),
        ]);
        for v in Dmi::adx(3).compute(&bars).into_iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(&v), "ADX out of bounds: {v}");
        }
    }

    #[test]
    fn uptrend_has_high_adx_and_plus_di_dominant() {
        let bars = trending_bars(40, 5.0);
        let adx = Dmi::adx(5).compute(&bars);
        let plus = Dmi::plus_di(5).compute(&bars);
        let minus = Dmi::minus_di(5).compute(&bars);
        let last = bars.len() - 1;
        assert!(adx[last] > 25.0, "ADX should be elevated, got {}", adx[last]);
        assert!(plus[last] > minus[last]);
    }

    #[test]
    fn downtrend_minus_di_dominant() {
        let bars = trending_bars(40, -2.0);
        let plus = Dmi::plus_di(5).compute(&bars);
        let minus = Dmi::minus_di(5).compute(&bars);
        let last = bars.len() - 1;
        assert!(minus[last] > plus[last]);
    }

    #[test]
    fn first_valid_index_matches_lookback() {
        let bars = trending_bars(40, 1.0);
        for dmi in [Dmi::adx(7), Dmi::plus_di(7), Dmi::minus_di(7)] {
            let values = dmi.compute(&bars);
            let first = values.iter().position(|v| !v.is_nan()).unwrap();
            assert_eq!(first, dmi.lookback(), "{}", dmi.name());
        }
    }

    #[test]
    fn flat_prices_give_zero_adx() {
        let bars = make_ohlc_bars(&[(10.0, 10.0, 10.0, 10.0); 20]);
        let adx = Dmi::adx(3).compute(&bars);
        assert_eq!(adx[19], 0.0);
    }

    #[test]
    fn names() {
        assert_eq!(Dmi::adx(14).name(), "adx_14");
        assert_eq!(Dmi::plus_di(14).name(), "plus_di_14");
        assert_eq!(Dmi::minus_di(14).name(), "minus_di_14");
    }
}
