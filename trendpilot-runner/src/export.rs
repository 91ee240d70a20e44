//! Report persistence: JSON reports and CSV traces.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use trendpilot_core::engine::{RunOutput, TraceRow};

use crate::portfolio::PortfolioReport;
use crate::runner::InstrumentReport;

/// Files written for one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub report_json: PathBuf,
    /// Present only for execute-mode runs that recorded a trace.
    pub trace_csv: Option<PathBuf>,
}

/// Render trace rows as CSV text with a header row.
pub fn trace_to_csv(rows: &[TraceRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).context("Failed to serialize trace row")?;
    }
    let bytes = writer.into_inner().context("Failed to flush trace CSV")?;
    String::from_utf8(bytes).context("Trace CSV is not UTF-8")
}

pub fn write_trace_csv(path: &Path, rows: &[TraceRow]) -> Result<()> {
    let text = trace_to_csv(rows)?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write trace CSV {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON {}", path.display()))
}

/// Write `<symbol>.json` and, when a trace exists, `<symbol>_trace.csv` into `dir`.
pub fn save_instrument(dir: &Path, report: &InstrumentReport) -> Result<ArtifactPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let stem = file_stem(&report.symbol);
    let report_json = dir.join(format!("{stem}.json"));
    write_json(&report_json, report)?;

    let trace_csv = match &report.output {
        RunOutput::Execution(exec) if !exec.trace.is_empty() => {
            let path = dir.join(format!("{stem}_trace.csv"));
            write_trace_csv(&path, &exec.trace)?;
            Some(path)
        }
        _ => None,
    };

    Ok(ArtifactPaths {
        report_json,
        trace_csv,
    })
}

/// Write `portfolio.json` plus per-instrument artifacts for every success.
pub fn save_portfolio(dir: &Path, report: &PortfolioReport) -> Result<Vec<ArtifactPaths>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    write_json(&dir.join("portfolio.json"), report)?;
    report
        .succeeded()
        .map(|instrument| save_instrument(dir, instrument))
        .collect()
}

/// Symbol made safe for use as a file name.
fn file_stem(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}
