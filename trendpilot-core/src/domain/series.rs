//! Series: an ordered, append-only sequence of bars for one instrument.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bar::Bar;

/// Validation failures for a price series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("series for '{symbol}' is empty")]
    Empty { symbol: String },

    #[error("bar dated {date} does not follow {previous} (dates must be strictly increasing)")]
    OutOfOrder { previous: NaiveDate, date: NaiveDate },

    #[error("bar dated {date} has a non-finite or non-positive close")]
    InvalidClose { date: NaiveDate },

    #[error("bar dated {date} has negative or non-finite volume {volume}")]
    NegativeVolume { date: NaiveDate, volume: f64 },

    #[error("bar dated {date} has non-finite prices or high/low outside the open/close body")]
    InsaneBar { date: NaiveDate },
}

/// Ordered bars with unique, strictly increasing dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    symbol: String,
    bars: Vec<Bar>,
}

impl Series {
    /// Build a series, validating ordering and per-bar values.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty { symbol });
        }
        let mut series = Self {
            symbol,
            bars: Vec::with_capacity(bars.len()),
        };
        for bar in bars {
            series.push(bar)?;
        }
        Ok(series)
    }

    /// Append a bar. The bar must be dated after the current last bar.
    pub fn push(&mut self, bar: Bar) -> Result<(), SeriesError> {
        if !bar.close.is_finite() || bar.close <= 0.0 {
            return Err(SeriesError::InvalidClose { date: bar.date });
        }
        if !(bar.volume.is_finite() && bar.volume >= 0.0) {
            return Err(SeriesError::NegativeVolume {
                date: bar.date,
                volume: bar.volume,
            });
        }
        if bar.is_void() || !bar.is_sane() {
            return Err(SeriesError::InsaneBar { date: bar.date });
        }
        if let Some(last) = self.bars.last() {
            if bar.date <= last.date {
                return Err(SeriesError::OutOfOrder {
                    previous: last.date,
                    date: bar.date,
                });
            }
        }
        self.bars.push(bar);
        Ok(())
    }

    /// Copy of this series with a synthetic next-day forecast bar appended.
    ///
    /// The forecast close is `last_close * (1 + forecast_change)`; open, high and
    /// low equal the close and volume carries over from the last real bar.
    pub fn with_forecast(&self, forecast_change: f64) -> Result<Self, SeriesError> {
        let last = self.bars.last().ok_or_else(|| SeriesError::Empty {
            symbol: self.symbol.clone(),
        })?;
        let forecast_close = last.close * (1.0 + forecast_change);
        let forecast = Bar::flat(last.date + Duration::days(1), forecast_close, last.volume);
        let mut extended = self.clone();
        extended.push(forecast)?;
        Ok(extended)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}
