//! Multi-instrument runs.
//!
//! Every instrument is loaded and driven independently on the rayon pool.
//! A failure is recorded on that instrument's outcome and never aborts the
//! others.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{RunConfig, RunId};
use crate::runner::{run_instrument, InstrumentReport, RunError, SCHEMA_VERSION};

/// Result for one instrument: a report or the reason it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentOutcome {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<InstrumentReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstrumentOutcome {
    fn from_result(symbol: &str, result: Result<InstrumentReport, RunError>) -> Self {
        match result {
            Ok(report) => Self {
                symbol: symbol.to_string(),
                report: Some(report),
                error: None,
            },
            Err(e) => {
                tracing::warn!(symbol, error = %e, "instrument run aborted");
                Self {
                    symbol: symbol.to_string(),
                    report: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        self.report.is_some()
    }
}

/// All outcomes of a portfolio run, in config order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub schema_version: u32,
    /// Fingerprint of the full run configuration.
    pub run_id: RunId,
    pub outcomes: Vec<InstrumentOutcome>,
}

impl PortfolioReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &InstrumentReport> {
        self.outcomes.iter().filter_map(|o| o.report.as_ref())
    }

    pub fn failed(&self) -> impl Iterator<Item = &InstrumentOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn get(&self, symbol: &str) -> Option<&InstrumentOutcome> {
        self.outcomes.iter().find(|o| o.symbol == symbol)
    }
}

/// Run every configured instrument, in parallel unless `parallel` is false.
pub fn run_portfolio(config: &RunConfig, parallel: bool) -> Result<PortfolioReport, RunError> {
    config.validate()?;
    let run_id = config.run_id()?;

    let run_one = |instrument: &crate::config::InstrumentConfig| {
        InstrumentOutcome::from_result(&instrument.symbol, run_instrument(instrument, config))
    };
    let outcomes: Vec<InstrumentOutcome> = if parallel {
        config.instruments.par_iter().map(run_one).collect()
    } else {
        config.instruments.iter().map(run_one).collect()
    };

    let report = PortfolioReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        outcomes,
    };
    tracing::info!(
        run_id = %report.run_id,
        succeeded = report.succeeded().count(),
        failed = report.failed().count(),
        "portfolio run complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstrumentConfig;
    use std::path::PathBuf;

    fn synthetic(symbol: &str) -> InstrumentConfig {
        InstrumentConfig {
            symbol: symbol.into(),
            csv: None,
            synthetic: true,
            forecast_change: None,
        }
    }

    fn config(instruments: Vec<InstrumentConfig>) -> RunConfig {
        RunConfig {
            strategy: Default::default(),
            instruments,
            synthetic_bars: 150,
        }
    }

    #[test]
    fn failing_instrument_is_isolated() {
        let mut missing = synthetic("MISSING");
        missing.csv = Some(PathBuf::from("/nonexistent/trendpilot/missing.csv"));
        let config = config(vec![synthetic("AAA"), missing, synthetic("BBB")]);

        let report = run_portfolio(&config, true).unwrap();
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.succeeded().count(), 2);
        let failed: Vec<_> = report.failed().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].symbol, "MISSING");
        assert!(failed[0].error.as_deref().unwrap_or("").contains("missing.csv"));
    }

    #[test]
    fn parallel_matches_sequential() {
        let config = config(vec![synthetic("AAA"), synthetic("BBB"), synthetic("CCC")]);
        let parallel = run_portfolio(&config, true).unwrap();
        let sequential = run_portfolio(&config, false).unwrap();
        assert_eq!(parallel, sequential);
        let order: Vec<&str> = parallel.outcomes.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = config(Vec::new());
        assert!(matches!(
            run_portfolio(&config, true),
            Err(RunError::Config(_))
        ));
    }
}
