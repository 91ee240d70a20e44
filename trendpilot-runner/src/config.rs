//! TOML run configuration: one strategy, many instruments.
//!
//! ```toml
//! [strategy]
//! base_buy_amount = 200.0
//! mode = "execute"
//!
//! [[instrument]]
//! symbol = "510300"
//! csv = "data/510300.csv"
//!
//! [[instrument]]
//! symbol = "DEMO"
//! synthetic = true
//! forecast_change = 0.004
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trendpilot_core::{EngineError, StrategyConfig};

/// Unique identifier for a run configuration (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config lists no instruments")]
    NoInstruments,

    #[error("instrument '{symbol}' needs either a csv path or synthetic = true")]
    NoSource { symbol: String },

    #[error("duplicate instrument '{symbol}'")]
    DuplicateSymbol { symbol: String },

    #[error(transparent)]
    Strategy(#[from] EngineError),

    #[error("config could not be serialized for hashing: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Where one instrument's bars come from, plus its optional forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv: Option<PathBuf>,
    /// Generate a deterministic random walk instead of reading a file.
    #[serde(default)]
    pub synthetic: bool,
    /// Next-day change used to build the forecast bar in advise mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default, rename = "instrument")]
    pub instruments: Vec<InstrumentConfig>,
    /// Bars per synthetic series.
    #[serde(default = "default_synthetic_bars")]
    pub synthetic_bars: usize,
}

fn default_synthetic_bars() -> usize {
    250
}

/// A file holding only a `[strategy]` table; any instruments are ignored.
#[derive(Debug, Deserialize)]
struct StrategyFile {
    #[serde(default)]
    strategy: StrategyConfig,
}

/// Load just the strategy section of a config file.
pub fn load_strategy(path: &Path) -> Result<StrategyConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: StrategyFile = toml::from_str(&text)?;
    file.strategy.validate()?;
    Ok(file.strategy)
}

impl RunConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. Relative csv paths resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            for instrument in &mut config.instruments {
                if let Some(csv) = instrument.csv.as_mut() {
                    if csv.is_relative() {
                        *csv = base.join(&*csv);
                    }
                }
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy.validate()?;
        if self.instruments.is_empty() {
            return Err(ConfigError::NoInstruments);
        }
        let mut seen = std::collections::HashSet::new();
        for instrument in &self.instruments {
            if instrument.csv.is_none() && !instrument.synthetic {
                return Err(ConfigError::NoSource {
                    symbol: instrument.symbol.clone(),
                });
            }
            if !seen.insert(instrument.symbol.as_str()) {
                return Err(ConfigError::DuplicateSymbol {
                    symbol: instrument.symbol.clone(),
                });
            }
        }
        Ok(())
    }

    /// Deterministic hash of the whole configuration.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}
