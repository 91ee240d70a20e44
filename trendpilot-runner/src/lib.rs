//! TrendPilot Runner: orchestration around `trendpilot-core`.
//!
//! - TOML run configs with one strategy and many instruments
//! - CSV loading (OHLCV or NAV-only) and deterministic synthetic series
//! - Single-instrument and parallel portfolio runs, fingerprinted with BLAKE3
//! - JSON report and CSV trace export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod portfolio;
pub mod runner;
pub mod synthetic;

pub use config::{load_strategy, ConfigError, InstrumentConfig, RunConfig, RunId};
pub use data_loader::{dataset_hash, load_csv, read_series, LoadError};
pub use export::{save_instrument, save_portfolio, trace_to_csv, write_json, ArtifactPaths};
pub use portfolio::{run_portfolio, InstrumentOutcome, PortfolioReport};
pub use runner::{
    load_instrument, run_fingerprint, run_instrument, run_series, DataSource, InstrumentReport,
    RunError, SCHEMA_VERSION,
};
pub use synthetic::generate_series;
