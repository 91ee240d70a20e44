//! TrendPilot CLI: backtest, advise and portfolio commands.
//!
//! Commands:
//! - `backtest`: simulate the strategy over a CSV or synthetic series
//! - `advise`: recommendation for the latest bar, optionally after a forecast
//! - `portfolio`: run every instrument in a TOML config and save reports

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trendpilot_core::engine::RunOutput;
use trendpilot_core::{Mode, Series, StrategyConfig};
use trendpilot_runner::runner::synthetic_start;
use trendpilot_runner::{
    export, generate_series, load_csv, load_strategy, run_portfolio, run_series, save_portfolio,
    DataSource, InstrumentReport, RunConfig,
};

#[derive(Parser)]
#[command(
    name = "trendpilot",
    about = "TrendPilot CLI: trend regime classification and transition decisions"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate fills over a whole series and print the final position.
    Backtest {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        strategy: StrategyArgs,

        /// Write the per-bar trace as CSV.
        #[arg(long)]
        trace_out: Option<PathBuf>,

        /// Write the full report as JSON.
        #[arg(long)]
        json_out: Option<PathBuf>,
    },
    /// Print a recommendation for the last bar.
    Advise {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        strategy: StrategyArgs,

        /// Expected next-day change (e.g. 0.01 for +1%); appends a forecast bar.
        #[arg(long, allow_hyphen_values = true)]
        forecast: Option<f64>,

        /// Also print the indicator summary.
        #[arg(long, default_value_t = false)]
        indicators: bool,

        /// Write the advice as JSON.
        #[arg(long)]
        json_out: Option<PathBuf>,
    },
    /// Run every instrument in a TOML config.
    Portfolio {
        /// Path to a TOML run config with [strategy] and [[instrument]] tables.
        config: PathBuf,

        /// Output directory for reports and traces.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Run instruments one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
}

/// Where the bars come from.
#[derive(Args)]
struct SourceArgs {
    /// CSV file with date and close columns (open/high/low/volume optional).
    #[arg(long, conflicts_with = "synthetic")]
    csv: Option<PathBuf>,

    /// Generate a deterministic synthetic series instead of reading a file.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Instrument symbol. Defaults to the CSV file stem, or DEMO for synthetic data.
    #[arg(long)]
    symbol: Option<String>,

    /// Bars to generate with --synthetic.
    #[arg(long, default_value_t = 250)]
    bars: usize,
}

/// Strategy settings: a config file plus command-line overrides.
#[derive(Args)]
struct StrategyArgs {
    /// TOML file with a [strategy] table.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cash per unit of buy ratio.
    #[arg(long)]
    base_amount: Option<f64>,

    /// Cash per unit of entry multiplier.
    #[arg(long)]
    entry_amount: Option<f64>,

    /// Starting cash for execute mode.
    #[arg(long)]
    initial_cash: Option<f64>,
}

impl StrategyArgs {
    fn resolve(&self, mode: Mode) -> Result<StrategyConfig> {
        let mut config = match &self.config {
            Some(path) => load_strategy(path)?,
            None => StrategyConfig::default(),
        };
        if let Some(amount) = self.base_amount {
            config.base_buy_amount = amount;
        }
        if self.entry_amount.is_some() {
            config.entry_amount = self.entry_amount;
        }
        if let Some(cash) = self.initial_cash {
            config.initial_cash = cash;
        }
        config.mode = mode;
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Backtest {
            source,
            strategy,
            trace_out,
            json_out,
        } => run_backtest_cmd(&source, &strategy, trace_out, json_out),
        Commands::Advise {
            source,
            strategy,
            forecast,
            indicators,
            json_out,
        } => run_advise_cmd(&source, &strategy, forecast, indicators, json_out),
        Commands::Portfolio {
            config,
            output_dir,
            sequential,
        } => run_portfolio_cmd(&config, &output_dir, !sequential),
    }
}

/// Diagnostics go to stderr so reports on stdout stay clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_source(source: &SourceArgs) -> Result<(Series, DataSource)> {
    match (&source.csv, source.synthetic) {
        (Some(path), _) => {
            let symbol = match &source.symbol {
                Some(symbol) => symbol.clone(),
                None => symbol_from_path(path),
            };
            let series = load_csv(path, &symbol)?;
            Ok((series, DataSource::Csv))
        }
        (None, true) => {
            let symbol = source.symbol.as_deref().unwrap_or("DEMO");
            let series = generate_series(symbol, synthetic_start(), source.bars)?;
            tracing::warn!(symbol, "using synthetic data");
            Ok((series, DataSource::Synthetic))
        }
        (None, false) => bail!("one of --csv or --synthetic is required"),
    }
}

fn symbol_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

fn run_backtest_cmd(
    source: &SourceArgs,
    strategy: &StrategyArgs,
    trace_out: Option<PathBuf>,
    json_out: Option<PathBuf>,
) -> Result<()> {
    let mut config = strategy.resolve(Mode::Execute)?;
    config.record_trace |= trace_out.is_some();
    let (series, data_source) = load_source(source)?;

    let report = run_series(&series, &config, None, data_source)?;
    let RunOutput::Execution(exec) = &report.output else {
        bail!("execute run returned no execution report");
    };

    println!("symbol:          {}", exec.symbol);
    println!("bars:            {} (warm-up {})", exec.bars, exec.warmup);
    match exec.entry_date {
        Some(date) => println!("entry date:      {date}"),
        None => println!("entry date:      none"),
    }
    println!("fills:           {}", exec.fills);
    println!("max held shares: {:.4}", exec.ledger.max_held_shares);
    println!("{}", exec.position);
    print_provenance(&report);

    if let Some(path) = trace_out {
        export::write_trace_csv(&path, &exec.trace)?;
        println!("Trace saved to: {}", path.display());
    }
    if let Some(path) = json_out {
        export::write_json(&path, &report)?;
        println!("Report saved to: {}", path.display());
    }
    Ok(())
}

fn run_advise_cmd(
    source: &SourceArgs,
    strategy: &StrategyArgs,
    forecast: Option<f64>,
    indicators: bool,
    json_out: Option<PathBuf>,
) -> Result<()> {
    let config = strategy.resolve(Mode::Advise)?;
    let (series, data_source) = load_source(source)?;

    let report = run_series(&series, &config, forecast, data_source)?;
    let RunOutput::Advice(advice) = &report.output else {
        bail!("advise run returned no advice");
    };

    println!("{}: {advice}", advice.symbol);
    if indicators {
        println!("{}", advice.summary);
    }
    print_provenance(&report);

    if let Some(path) = json_out {
        export::write_json(&path, &report)?;
        println!("Advice saved to: {}", path.display());
    }
    Ok(())
}

fn run_portfolio_cmd(config_path: &Path, output_dir: &Path, parallel: bool) -> Result<()> {
    let config = RunConfig::load(config_path)
        .with_context(|| format!("Failed to load run config {}", config_path.display()))?;
    let report = run_portfolio(&config, parallel)?;

    for outcome in &report.outcomes {
        match (&outcome.report, &outcome.error) {
            (Some(instrument), _) => println!("{}", summary_line(instrument)),
            (None, Some(error)) => println!("{:<12} FAILED: {error}", outcome.symbol),
            (None, None) => println!("{:<12} no result", outcome.symbol),
        }
    }

    save_portfolio(output_dir, &report)?;
    println!("Run ID: {}", report.run_id);
    println!("Reports saved to: {}", output_dir.display());

    if report.failed().count() > 0 {
        eprintln!(
            "{} of {} instruments failed",
            report.failed().count(),
            report.outcomes.len()
        );
        std::process::exit(1);
    }
    Ok(())
}

fn summary_line(report: &InstrumentReport) -> String {
    let tag = if report.is_synthetic() { " [synthetic]" } else { "" };
    match &report.output {
        RunOutput::Execution(exec) => format!(
            "{:<12} fills={:<4} held={:.2} equity={:.2} realized={:.2}{tag}",
            report.symbol,
            exec.fills,
            exec.position.held_shares,
            exec.position.equity,
            exec.position.realized_pnl,
        ),
        RunOutput::Advice(advice) => {
            format!("{:<12} {} {}{tag}", report.symbol, advice.date, advice.text)
        }
    }
}

fn print_provenance(report: &InstrumentReport) {
    println!("Run ID: {}", report.run_id);
    if report.is_synthetic() {
        println!("WARNING: results computed on synthetic data");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backtest_with_overrides() {
        let cli = Cli::try_parse_from([
            "trendpilot",
            "backtest",
            "--synthetic",
            "--symbol",
            "ABC",
            "--base-amount",
            "150",
        ])
        .unwrap();
        let Commands::Backtest { source, strategy, .. } = cli.command else {
            panic!("expected backtest");
        };
        assert!(source.synthetic);
        let config = strategy.resolve(Mode::Execute).unwrap();
        assert_eq!(config.base_buy_amount, 150.0);
        assert_eq!(config.mode, Mode::Execute);
    }

    #[test]
    fn advise_accepts_negative_forecast() {
        let cli =
            Cli::try_parse_from(["trendpilot", "advise", "--synthetic", "--forecast", "-0.02"])
                .unwrap();
        let Commands::Advise { forecast, .. } = cli.command else {
            panic!("expected advise");
        };
        assert_eq!(forecast, Some(-0.02));
    }

    #[test]
    fn csv_and_synthetic_conflict() {
        assert!(Cli::try_parse_from([
            "trendpilot",
            "backtest",
            "--synthetic",
            "--csv",
            "a.csv"
        ])
        .is_err());
    }

    #[test]
    fn symbol_defaults_to_file_stem() {
        assert_eq!(symbol_from_path(Path::new("data/510300.csv")), "510300");
    }
}
