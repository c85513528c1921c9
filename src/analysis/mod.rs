//! Control-versus-case analysis pipeline.
//!
//! Data flows through the submodules in this order:
//!
//! - **[`significance`]**: screen each case group against the control group and keep the means
//!   of significant features
//! - **[`baseline`]**: control-group mean of every feature
//! - **[`ranking`]**: order a group's significant features by deviation from the baseline
//! - **[`correlation`]**: correlate ranked features within a group and extract co-varying pairs
//! - **[`report`]**: per-feature and per-group read-only views
//!
//! [`AnalysisContext`] runs the first two stages once and answers the remaining queries.

pub mod baseline;
pub mod context;
pub mod correlation;
pub mod ranking;
pub mod report;
pub mod significance;

pub use baseline::{Baseline, baseline};
pub use context::{AnalysisContext, Query};
pub use correlation::{
    CorrelationAnalysis, CorrelationAnalyzer, CorrelationMatrix, SignificantPair, correlate,
};
pub use ranking::{RankedFeature, Ranking, rank};
pub use report::{DescriptiveStats, FeatureGroupEntry, FeatureReport, GroupSummary};
pub use significance::{SignificanceFilter, SignificanceMatrix, SignificanceRow, filter};
