//! Strategy configuration.

use serde::{Deserialize, Serialize};

use super::error::EngineError;

/// Whether fills are simulated or only advised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Execute,
    Advise,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Execute => write!(f, "execute"),
            Mode::Advise => write!(f, "advise"),
        }
    }
}

/// Sizing, floors and mode of one strategy run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Cash per unit of positive directive ratio.
    pub base_buy_amount: f64,
    /// Cash per unit of entry multiplier; `base_buy_amount` when unset.
    pub entry_amount: Option<f64>,
    /// Fraction of the holding sold per unit of negative directive ratio.
    pub reduce_step: f64,
    /// Fraction of peak holding that is never sold.
    pub bottom_ratio: f64,
    pub initial_cash: f64,
    /// Cash that is never spent.
    pub min_cash_buffer: f64,
    /// Moving-average tangle tolerance of the consolidation rule.
    pub osc_band_tol: f64,
    /// Bars to wait for a qualifying entry before entering anyway.
    pub entry_timeout_bars: usize,
    pub mode: Mode,
    /// Keep a per-bar trace in execute mode.
    pub record_trace: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            base_buy_amount: 200.0,
            entry_amount: None,
            reduce_step: 0.10,
            bottom_ratio: 0.10,
            initial_cash: 10_000.0,
            min_cash_buffer: 0.0,
            osc_band_tol: 0.02,
            entry_timeout_bars: 5,
            mode: Mode::Execute,
            record_trace: false,
        }
    }
}

impl StrategyConfig {
    pub fn entry_amount(&self) -> f64 {
        self.entry_amount.unwrap_or(self.base_buy_amount)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        positive("base_buy_amount", self.base_buy_amount)?;
        positive("entry_amount", self.entry_amount())?;
        fraction("reduce_step", self.reduce_step)?;
        fraction("bottom_ratio", self.bottom_ratio)?;
        fraction("osc_band_tol", self.osc_band_tol)?;
        non_negative("initial_cash", self.initial_cash)?;
        non_negative("min_cash_buffer", self.min_cash_buffer)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be >= 0, got {value}")))
    }
}

fn fraction(field: &'static str, value: f64) -> Result<(), EngineError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("must be within [0, 1], got {value}")))
    }
}
