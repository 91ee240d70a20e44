//! Strategy driver.
//!
//! A run is a fold of [`StrategyDriver::step`] over the bars of a series.
//! All mutable run state lives in [`DriverState`], which is passed in and
//! returned by value, so any bar can be replayed in isolation.
//!
//! Execute mode walks two phases. The entry phase waits for a qualifying
//! entry score (or for the timeout) and opens the first position. The
//! transition phase classifies every bar, asks the transition engine for a
//! directive and fills it at the bar's close, with buys capped by spendable
//! cash and sells capped by the bottom-ratio floor.
//!
//! Advise mode reads only the last bar (typically a forecast bar) and never
//! touches a ledger.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::decision::{Directive, TransitionEngine};
use crate::domain::{PositionLedger, Series};
use crate::features::{BarView, FeatureFrame, FeaturePipeline};
use crate::regime::{RegimeClassifier, TrendState};

use super::advice::{Advice, IndicatorSummary};
use super::config::{Mode, StrategyConfig};
use super::entry::EntryScore;
use super::error::EngineError;
use super::report::{BarAction, ExecutionReport, PositionReport, TraceRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No entry yet; `waited` bars have passed without a qualifying score.
    Entry { waited: usize },
    Transition,
}

/// Everything that carries from one bar to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverState {
    pub phase: Phase,
    pub prev_trend: Option<TrendState>,
    pub ledger: PositionLedger,
    pub cash: f64,
}

impl DriverState {
    pub fn new(cash: f64) -> Self {
        Self {
            phase: Phase::Entry { waited: 0 },
            prev_trend: None,
            ledger: PositionLedger::new(),
            cash,
        }
    }
}

/// Result of one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: DriverState,
    pub trend: TrendState,
    pub directive: Directive,
    pub action: BarAction,
    /// Signed shares filled on this bar.
    pub fill_shares: f64,
}

/// Output of [`StrategyDriver::run`], by mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunOutput {
    Execution(ExecutionReport),
    Advice(Advice),
}

#[derive(Debug)]
pub struct StrategyDriver {
    config: StrategyConfig,
    pipeline: FeaturePipeline,
    classifier: RegimeClassifier,
    engine: TransitionEngine,
}

impl StrategyDriver {
    pub fn new(config: StrategyConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            classifier: RegimeClassifier::new(config.osc_band_tol),
            config,
            pipeline: FeaturePipeline::standard(),
            engine: TransitionEngine::default(),
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn warmup(&self) -> usize {
        self.pipeline.warmup()
    }

    /// Shortest series that produces at least one decision.
    pub fn min_bars(&self) -> usize {
        self.warmup() + 1
    }

    pub fn features(&self, series: &Series) -> FeatureFrame {
        self.pipeline.compute(series.bars())
    }

    pub fn classify(&self, view: &BarView<'_>) -> TrendState {
        self.classifier.classify(view.current())
    }

    fn check_length(&self, series: &Series) -> Result<(), EngineError> {
        let need = self.min_bars();
        if series.len() < need {
            return Err(EngineError::InsufficientData {
                have: series.len(),
                need,
            });
        }
        Ok(())
    }

    fn spendable(&self, state: &DriverState) -> f64 {
        (state.cash - self.config.min_cash_buffer).max(0.0)
    }

    /// Evaluate one post-warm-up bar and apply any fill to a copy of `state`.
    pub fn step(&self, state: DriverState, view: &BarView<'_>) -> Step {
        let trend = self.classify(view);
        let close = view.current().close;
        let mut next = state;

        match state.phase {
            Phase::Entry { waited } => {
                let score = EntryScore::evaluate(view);
                let multiplier = score.multiplier();
                if multiplier == 0.0 && waited < self.config.entry_timeout_bars {
                    next.phase = Phase::Entry { waited: waited + 1 };
                    return Step {
                        state: next,
                        trend,
                        directive: Directive::hold(format!(
                            "awaiting entry, score {}/4",
                            score.points()
                        )),
                        action: BarAction::AwaitingEntry,
                        fill_shares: 0.0,
                    };
                }

                let rationale = if multiplier > 0.0 {
                    format!("entry at {multiplier}x, score {}/4", score.points())
                } else {
                    "entry timeout, no qualifying score".to_string()
                };
                let amount = (self.config.entry_amount() * multiplier).min(self.spendable(&state));
                let fill_shares = if amount > 0.0 {
                    buy(&mut next, amount, close)
                } else {
                    0.0
                };
                next.phase = Phase::Transition;
                next.prev_trend = Some(trend);
                Step {
                    state: next,
                    trend,
                    directive: Directive::new(multiplier, rationale),
                    action: BarAction::Entry,
                    fill_shares,
                }
            }
            Phase::Transition => {
                let prev = state.prev_trend.unwrap_or(trend);
                let directive = self.engine.decide(prev, trend, view);
                next.prev_trend = Some(trend);

                let mut action = BarAction::Hold;
                let mut fill_shares = 0.0;
                if directive.is_buy() {
                    let amount =
                        (self.config.base_buy_amount * directive.ratio).min(self.spendable(&state));
                    if amount > 0.0 {
                        fill_shares = buy(&mut next, amount, close);
                        action = BarAction::Buy;
                    }
                } else if directive.is_sell() && !state.ledger.is_flat() {
                    let wanted =
                        state.ledger.held_shares * self.config.reduce_step * -directive.ratio;
                    let size = wanted.min(state.ledger.reducible_shares(self.config.bottom_ratio));
                    if size > 0.0 {
                        fill_shares = sell(&mut next, size, close);
                        action = BarAction::Sell;
                    }
                }

                Step {
                    state: next,
                    trend,
                    directive,
                    action,
                    fill_shares,
                }
            }
        }
    }

    /// Simulate fills over the whole series.
    pub fn run_execute(&self, series: &Series) -> Result<ExecutionReport, EngineError> {
        self.check_length(series)?;
        let bars = series.bars();
        let frame = self.pipeline.compute(bars);

        let mut state = DriverState::new(self.config.initial_cash);
        let mut trace = Vec::new();
        let mut fills = 0;
        let mut entry_date = None;

        for (i, bar) in bars.iter().enumerate() {
            let Some(view) = frame.view(i).filter(|_| frame.is_warm(i)) else {
                if self.config.record_trace {
                    let directive = Directive::hold("warm-up");
                    trace.push(trace_row(bar, None, &directive, BarAction::Warmup, 0.0, &state));
                }
                continue;
            };

            let step = self.step(state, &view);
            debug!(
                symbol = %series.symbol(),
                date = %bar.date,
                trend = %step.trend,
                ratio = step.directive.ratio,
                rationale = %step.directive.rationale,
                "directive"
            );
            if step.fill_shares != 0.0 {
                fills += 1;
                debug!(
                    symbol = %series.symbol(),
                    date = %bar.date,
                    shares = step.fill_shares,
                    price = bar.close,
                    held = step.state.ledger.held_shares,
                    cash = step.state.cash,
                    "fill"
                );
            }
            if step.action == BarAction::Entry {
                entry_date = Some(bar.date);
            }
            if self.config.record_trace {
                trace.push(trace_row(
                    bar,
                    Some(step.trend),
                    &step.directive,
                    step.action,
                    step.fill_shares,
                    &step.state,
                ));
            }
            state = step.state;
        }

        let last = series.last().ok_or(EngineError::InsufficientData {
            have: 0,
            need: self.min_bars(),
        })?;
        let position = PositionReport::mark(&state.ledger, state.cash, last.date, last.close);
        info!(
            symbol = %series.symbol(),
            bars = bars.len(),
            fills,
            held = state.ledger.held_shares,
            realized = state.ledger.realized_pnl,
            equity = position.equity,
            "execute run complete"
        );

        Ok(ExecutionReport {
            symbol: series.symbol().to_string(),
            bars: bars.len(),
            warmup: frame.warmup(),
            entry_date,
            fills,
            ledger: state.ledger,
            cash: state.cash,
            position,
            trace,
        })
    }

    /// Advice for the last bar, optionally after appending a forecast bar.
    pub fn run_advise(
        &self,
        series: &Series,
        forecast_change: Option<f64>,
    ) -> Result<Advice, EngineError> {
        let extended;
        let series = match forecast_change {
            Some(change) => {
                extended = series.with_forecast(change)?;
                &extended
            }
            None => series,
        };
        self.check_length(series)?;

        let frame = self.pipeline.compute(series.bars());
        let last = series.len() - 1;
        let view = frame.view(last).ok_or(EngineError::InsufficientData {
            have: series.len(),
            need: self.min_bars(),
        })?;

        let trend = self.classify(&view);
        let prev_trend = match frame.view(last - 1) {
            Some(prev) if frame.is_warm(last - 1) => self.classify(&prev),
            _ => trend,
        };
        let directive = self.engine.decide(prev_trend, trend, &view);
        let entry = EntryScore::evaluate(&view);
        let entry_suggestion = self.config.entry_amount() * entry.multiplier();
        let text = self.advice_text(&directive, trend, entry_suggestion);
        let bar = &series.bars()[last];

        info!(
            symbol = %series.symbol(),
            date = %bar.date,
            trend = %trend,
            ratio = directive.ratio,
            "advise run complete"
        );

        Ok(Advice {
            symbol: series.symbol().to_string(),
            date: bar.date,
            close: bar.close,
            forecast_change,
            summary: IndicatorSummary::of(&view, prev_trend, trend),
            directive,
            entry,
            entry_suggestion,
            text,
        })
    }

    fn advice_text(&self, directive: &Directive, trend: TrendState, entry_suggestion: f64) -> String {
        if directive.is_buy() {
            format!(
                "{} {:.2}",
                directive.rationale,
                self.config.base_buy_amount * directive.ratio
            )
        } else if directive.is_sell() {
            format!(
                "{}, reduce {:.2}% of position",
                directive.rationale,
                self.config.reduce_step * -directive.ratio * 100.0
            )
        } else if entry_suggestion > 0.0 && trend == TrendState::Consolidation {
            format!("range market, entry opportunity, suggest investing {entry_suggestion:.2}")
        } else if entry_suggestion > 0.0 {
            format!("suggest opening position: {entry_suggestion:.2}")
        } else {
            directive.rationale.clone()
        }
    }

    /// Run in the configured mode.
    pub fn run(&self, series: &Series, forecast_change: Option<f64>) -> Result<RunOutput, EngineError> {
        match self.config.mode {
            Mode::Execute => self.run_execute(series).map(RunOutput::Execution),
            Mode::Advise => self.run_advise(series, forecast_change).map(RunOutput::Advice),
        }
    }
}

fn buy(state: &mut DriverState, amount: f64, price: f64) -> f64 {
    let shares = amount / price;
    state.ledger.apply_fill(shares, price);
    state.cash -= amount;
    shares
}

fn sell(state: &mut DriverState, shares: f64, price: f64) -> f64 {
    state.ledger.apply_fill(-shares, price);
    state.cash += shares * price;
    -shares
}

fn trace_row(
    bar: &crate::domain::Bar,
    trend: Option<TrendState>,
    directive: &Directive,
    action: BarAction,
    fill_shares: f64,
    state: &DriverState,
) -> TraceRow {
    TraceRow {
        date: bar.date,
        close: bar.close,
        trend,
        ratio: directive.ratio,
        rationale: directive.rationale.clone(),
        action,
        fill_shares,
        held_shares: state.ledger.held_shares,
        cost_basis: state.ledger.cost_basis,
        realized_pnl: state.ledger.realized_pnl,
        max_held_shares: state.ledger.max_held_shares,
        cash: state.cash,
    }
}

/// Execute-mode run with a one-off driver.
pub fn run_execute(series: &Series, config: &StrategyConfig) -> Result<ExecutionReport, EngineError> {
    StrategyDriver::new(config.clone())?.run_execute(series)
}

/// Advise-mode run with a one-off driver.
pub fn run_advise(
    series: &Series,
    config: &StrategyConfig,
    forecast_change: Option<f64>,
) -> Result<Advice, EngineError> {
    StrategyDriver::new(config.clone())?.run_advise(series, forecast_change)
}
