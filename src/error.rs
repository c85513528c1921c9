//! Error and advisory types shared by the analysis pipeline.
//!
//! Two kinds of conditions exist. [`PipelineError`] covers hard failures: they are returned
//! wrapped in an [`anyhow::Error`] and can be recovered with `downcast_ref::<PipelineError>()`.
//! [`Advisory`] covers everything the pipeline absorbs locally (parameter fallbacks, skipped
//! groups, correlation with too little data); advisories travel with the result that produced
//! them and are also emitted through the `log` facade.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("dataset contains no samples")]
    EmptyDataset,

    #[error("control group '{control}' has no samples")]
    MissingControl { control: String },

    #[error("group '{group}' does not exist")]
    UnknownGroup { group: String },

    #[error("group '{group}' has {samples} sample(s) and was not tested against the control")]
    GroupNotTested { group: String, samples: usize },

    #[error("feature '{feature}' does not exist")]
    UnknownFeature { feature: String },

    #[error("feature '{feature}' appears more than once")]
    DuplicateFeature { feature: String },

    #[error("expected {expected} values but found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("label column '{column}' not found in header")]
    MissingLabelColumn { column: String },

    #[error("no feature columns remain after skipping {skipped} leading column(s)")]
    NoFeatureColumns { skipped: usize },

    #[error("row {row}, column '{column}': '{value}' is not a number")]
    NonNumericCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}, column '{column}': {value} is not a finite expression level")]
    NonFiniteValue {
        row: usize,
        column: String,
        value: f64,
    },
}

/// A non-fatal condition raised while computing a result.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// An out-of-range parameter was replaced by its documented default.
    ConfigFallback {
        parameter: &'static str,
        supplied: String,
        fallback: String,
    },
    /// A case group had too few samples for the variance test and was skipped.
    InsufficientSamples { group: String, samples: usize },
    /// Correlation could not be computed meaningfully for the group.
    InsufficientCorrelationData { group: String, features: usize },
}

impl Advisory {
    pub fn is_config_fallback(&self) -> bool {
        matches!(self, Advisory::ConfigFallback { .. })
    }

    /// Log the advisory as a warning and hand it back.
    pub(crate) fn emit(self) -> Self {
        log::warn!("{self}");
        self
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::ConfigFallback {
                parameter,
                supplied,
                fallback,
            } => write!(
                f,
                "invalid {parameter} ({supplied}); using default {fallback} instead"
            ),
            Advisory::InsufficientSamples { group, samples } => write!(
                f,
                "not enough samples for '{group}' ({samples}); group skipped"
            ),
            Advisory::InsufficientCorrelationData { group, features } => write!(
                f,
                "not enough data to correlate {features} feature(s) in '{group}'"
            ),
        }
    }
}
