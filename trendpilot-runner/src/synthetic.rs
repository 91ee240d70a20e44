//! Deterministic synthetic series for demos and offline runs.
//!
//! A regime-switching random walk: drift flips between up, down and flat
//! legs so the classifier sees every state. The RNG is seeded from the
//! symbol, so the same symbol always yields the same bars.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trendpilot_core::{Bar, Series, SeriesError};

const START_PRICE: f64 = 100.0;
/// Bars per drift leg, inclusive range.
const LEG_BARS: (usize, usize) = (15, 40);
/// Per-bar drift for (up, flat, down) legs.
const DRIFTS: [f64; 3] = [0.004, 0.0, -0.004];

/// Generate `bars` weekday bars starting on or after `start`.
pub fn generate_series(symbol: &str, start: NaiveDate, bars: usize) -> Result<Series, SeriesError> {
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut out = Vec::with_capacity(bars);
    let mut price = START_PRICE;
    let mut date = start;
    let mut drift = 0.0;
    let mut leg_left = 0usize;

    while out.len() < bars {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date += Duration::days(1);
            continue;
        }
        if leg_left == 0 {
            drift = DRIFTS[rng.gen_range(0..DRIFTS.len())];
            leg_left = rng.gen_range(LEG_BARS.0..=LEG_BARS.1);
        }
        leg_left -= 1;

        let daily_return = drift + rng.gen_range(-0.015..0.015);
        let open = price;
        let close = (price * (1.0 + daily_return)).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000.0..5_000_000.0_f64).round();

        out.push(Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
        date += Duration::days(1);
    }

    Series::new(symbol, out)
}
