//! Single-instrument run: resolve bars, drive the strategy, tag the result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use trendpilot_core::engine::RunOutput;
use trendpilot_core::{EngineError, Mode, Series, SeriesError, StrategyConfig, StrategyDriver};

use crate::config::{ConfigError, InstrumentConfig, RunConfig, RunId};
use crate::data_loader::{dataset_hash, load_csv, LoadError};
use crate::synthetic::generate_series;

/// Current schema version for exported reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from running a single instrument.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("series error: {0}")]
    Series(#[from] SeriesError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("fingerprint error: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Where a run's bars came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    Synthetic,
}

/// One instrument's run output plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentReport {
    pub schema_version: u32,
    pub symbol: String,
    /// Hash of the strategy config and the input bars.
    pub run_id: RunId,
    pub dataset_hash: String,
    pub source: DataSource,
    pub mode: Mode,
    pub output: RunOutput,
}

impl InstrumentReport {
    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

/// First date of generated series.
pub fn synthetic_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

/// Deterministic id for (strategy, dataset).
pub fn run_fingerprint(strategy: &StrategyConfig, dataset_hash: &str) -> Result<RunId, serde_json::Error> {
    let json = serde_json::to_string(strategy)?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(json.as_bytes());
    hasher.update(dataset_hash.as_bytes());
    Ok(hasher.finalize().to_hex().to_string())
}

/// Run an already-loaded series. No I/O.
pub fn run_series(
    series: &Series,
    strategy: &StrategyConfig,
    forecast_change: Option<f64>,
    source: DataSource,
) -> Result<InstrumentReport, RunError> {
    let driver = StrategyDriver::new(strategy.clone())?;
    let output = driver.run(series, forecast_change)?;
    let dataset_hash = dataset_hash(series);
    let run_id = run_fingerprint(strategy, &dataset_hash)?;

    Ok(InstrumentReport {
        schema_version: SCHEMA_VERSION,
        symbol: series.symbol().to_string(),
        run_id,
        dataset_hash,
        source,
        mode: strategy.mode,
        output,
    })
}

/// Resolve an instrument's bars: CSV when a path is given, else synthetic.
pub fn load_instrument(
    instrument: &InstrumentConfig,
    synthetic_bars: usize,
) -> Result<(Series, DataSource), RunError> {
    match &instrument.csv {
        Some(path) => Ok((load_csv(path, &instrument.symbol)?, DataSource::Csv)),
        None => {
            tracing::warn!(
                symbol = %instrument.symbol,
                "generating synthetic data, results are tagged as synthetic"
            );
            let series = generate_series(&instrument.symbol, synthetic_start(), synthetic_bars)?;
            Ok((series, DataSource::Synthetic))
        }
    }
}

/// Load and run one configured instrument.
pub fn run_instrument(
    instrument: &InstrumentConfig,
    config: &RunConfig,
) -> Result<InstrumentReport, RunError> {
    let (series, source) = load_instrument(instrument, config.synthetic_bars)?;
    let report = run_series(&series, &config.strategy, instrument.forecast_change, source)?;
    tracing::info!(
        symbol = %report.symbol,
        run_id = %report.run_id,
        bars = series.len(),
        "instrument run complete"
    );
    Ok(report)
}
