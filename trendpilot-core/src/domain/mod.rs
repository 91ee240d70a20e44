//! Domain types for TrendPilot

pub mod bar;
pub mod ledger;
pub mod series;

pub use bar::Bar;
pub use ledger::{PositionLedger, LEDGER_EPSILON};
pub use series::{Series, SeriesError};
