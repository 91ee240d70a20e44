//! CSV series loading.
//!
//! Accepts daily OHLCV files with a header row. Only `date` and `close` are
//! required: NAV histories without open/high/low become flat bars, and a
//! missing volume column loads as zero volume. Rows may arrive in either
//! date order; they are sorted ascending before validation.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use trendpilot_core::{Bar, Series, SeriesError};

/// Date formats accepted in the `date` column.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: unrecognized date '{value}'")]
    BadDate { row: usize, value: String },

    #[error(transparent)]
    Series(#[from] SeriesError),
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

impl CsvRow {
    fn into_bar(self, row: usize) -> Result<Bar, LoadError> {
        let date = parse_date(&self.date).ok_or_else(|| LoadError::BadDate {
            row,
            value: self.date.clone(),
        })?;
        let volume = self.volume.unwrap_or(0.0);
        let bar = match (self.open, self.high, self.low) {
            (Some(open), Some(high), Some(low)) => Bar {
                date,
                open,
                high,
                low,
                close: self.close,
                volume,
            },
            _ => Bar::flat(date, self.close, volume),
        };
        Ok(bar)
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Parse CSV text from any reader into a validated series.
pub fn read_series<R: Read>(reader: R, symbol: &str) -> Result<Series, LoadError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();
    for (i, record) in csv.deserialize::<CsvRow>().enumerate() {
        // Row numbers are 1-based and skip the header.
        bars.push(record?.into_bar(i + 2)?);
    }
    bars.sort_by_key(|bar| bar.date);

    Ok(Series::new(symbol, bars)?)
}

/// Load one instrument's bars from a CSV file.
pub fn load_csv(path: &Path, symbol: &str) -> Result<Series, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = read_series(file, symbol)?;
    tracing::debug!(
        symbol,
        path = %path.display(),
        bars = series.len(),
        "loaded series"
    );
    Ok(series)
}

/// Deterministic BLAKE3 hash over a series' symbol and bar values.
pub fn dataset_hash(series: &Series) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(series.symbol().as_bytes());
    for bar in series.bars() {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
