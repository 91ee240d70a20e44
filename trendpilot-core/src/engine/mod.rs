//! Strategy engine: configuration, entry gating, the per-bar driver and its
//! execute/advise outputs.

pub mod advice;
pub mod config;
pub mod driver;
pub mod entry;
pub mod error;
pub mod report;

pub use advice::{Advice, IndicatorSummary};
pub use config::{Mode, StrategyConfig};
pub use driver::{run_advise, run_execute, DriverState, Phase, RunOutput, Step, StrategyDriver};
pub use entry::EntryScore;
pub use error::EngineError;
pub use report::{BarAction, ExecutionReport, PositionReport, TraceRow};
