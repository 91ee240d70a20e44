//! Engine error type.

use thiserror::Error;

use crate::domain::SeriesError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("insufficient data: {have} bars, need at least {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("invalid strategy config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error(transparent)]
    Series(#[from] SeriesError),
}
