//! Feature pipeline: indicator trait, precomputed values, per-bar feature sets.

pub mod indicator;
pub mod pipeline;

pub use indicator::{compute_warmup, precompute_indicators, Indicator, IndicatorValues};
pub use pipeline::{BarView, FeatureFrame, FeaturePipeline, FeatureSet};
