//! Execute-mode outputs: per-bar trace and end-of-run position report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::PositionLedger;
use crate::regime::TrendState;

/// What the driver did on one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarAction {
    Warmup,
    AwaitingEntry,
    Entry,
    Buy,
    Sell,
    /// No fill: zero directive, or an amount clipped to nothing.
    Hold,
}

/// One row of the execute-mode trace. Flat so it maps onto a CSV record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRow {
    pub date: NaiveDate,
    pub close: f64,
    pub trend: Option<TrendState>,
    pub ratio: f64,
    pub rationale: String,
    pub action: BarAction,
    /// Signed shares filled on this bar (0 when nothing filled).
    pub fill_shares: f64,
    pub held_shares: f64,
    pub cost_basis: f64,
    pub realized_pnl: f64,
    pub max_held_shares: f64,
    pub cash: f64,
}

/// Position snapshot marked at the last close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub date: NaiveDate,
    pub close: f64,
    pub held_shares: f64,
    pub cost_basis: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    pub realized_pnl: f64,
    /// `None` when nothing is held at cost.
    pub hold_roi: Option<f64>,
    pub cash: f64,
    pub equity: f64,
}

impl PositionReport {
    pub fn mark(ledger: &PositionLedger, cash: f64, date: NaiveDate, close: f64) -> Self {
        let market_value = ledger.market_value(close);
        Self {
            date,
            close,
            held_shares: ledger.held_shares,
            cost_basis: ledger.cost_basis,
            market_value,
            unrealized_pnl: ledger.unrealized_pnl(close),
            realized_pnl: ledger.realized_pnl,
            hold_roi: ledger.hold_roi(close),
            cash,
            equity: cash + market_value,
        }
    }
}

impl std::fmt::Display for PositionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "final date:      {}", self.date)?;
        writeln!(f, "held shares:     {:.4}", self.held_shares)?;
        writeln!(f, "cost basis:      {:.2}", self.cost_basis)?;
        writeln!(f, "market value:    {:.2}", self.market_value)?;
        writeln!(f, "unrealized PnL:  {:.2}", self.unrealized_pnl)?;
        writeln!(f, "realized PnL:    {:.2}", self.realized_pnl)?;
        match self.hold_roi {
            Some(roi) => writeln!(f, "hold ROI:        {:.2}%", roi * 100.0)?,
            None => writeln!(f, "hold ROI:        n/a (no cost basis)")?,
        }
        writeln!(f, "cash:            {:.2}", self.cash)?;
        write!(f, "total equity:    {:.2}", self.equity)
    }
}

/// Result of an execute-mode run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub symbol: String,
    pub bars: usize,
    pub warmup: usize,
    /// Date of the entry bar, if the entry phase completed.
    pub entry_date: Option<NaiveDate>,
    pub fills: usize,
    pub ledger: PositionLedger,
    pub cash: f64,
    pub position: PositionReport,
    /// Empty unless the config asked for a trace.
    pub trace: Vec<TraceRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_and_display() {
        let mut ledger = PositionLedger::new();
        ledger.apply_fill(100.0, 2.0);
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let report = PositionReport::mark(&ledger, 800.0, date, 2.5);
        assert_eq!(report.market_value, 250.0);
        assert_eq!(report.unrealized_pnl, 50.0);
        assert_eq!(report.hold_roi, Some(0.25));
        assert_eq!(report.equity, 1050.0);
        let text = report.to_string();
        assert!(text.contains("hold ROI:        25.00%"));
    }

    #[test]
    fn flat_ledger_has_no_roi() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let report = PositionReport::mark(&PositionLedger::new(), 1000.0, date, 3.0);
        assert_eq!(report.hold_roi, None);
        assert!(report.to_string().contains("n/a"));
    }
}
