//! Analysis parameters and their validation.
//!
//! Out-of-range parameters never abort the pipeline. Each `resolve_*` function returns the
//! value to use, substituting the documented default and recording an [`Advisory`] when the
//! supplied value is unusable.

use crate::error::Advisory;
use crate::testing::correction::Correction;

pub const DEFAULT_CONTROL_GROUP: &str = "normal";
pub const DEFAULT_ALPHA: f64 = 0.01;
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.7;

/// The smallest ranking size worth correlating.
pub const MIN_TOP_K: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Label of the reference group every other group is compared against
    pub control_group: String,
    /// Significance level for the per-feature variance test, in (0, 1)
    pub alpha: f64,
    /// Number of top deviating features kept per group, at least 2
    pub top_k: usize,
    /// Minimum absolute correlation for a pair to be reported, |t| <= 1
    pub correlation_threshold: f64,
    /// Optional multiple testing correction applied per group before thresholding
    pub correction: Correction,
    /// Test case groups on the rayon pool
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            control_group: DEFAULT_CONTROL_GROUP.to_string(),
            alpha: DEFAULT_ALPHA,
            top_k: DEFAULT_TOP_K,
            correlation_threshold: DEFAULT_CORRELATION_THRESHOLD,
            correction: Correction::None,
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    pub fn with_control_group(mut self, control_group: &str) -> Self {
        self.control_group = control_group.to_string();
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_correlation_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = threshold;
        self
    }

    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.correction = correction;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Return a copy with every numeric parameter replaced by a usable value.
    pub fn resolved(&self, advisories: &mut Vec<Advisory>) -> Self {
        AnalysisConfig {
            control_group: self.control_group.clone(),
            alpha: resolve_alpha(self.alpha, advisories),
            top_k: resolve_top_k(self.top_k, advisories),
            correlation_threshold: resolve_threshold(self.correlation_threshold, advisories),
            correction: self.correction,
            parallel: self.parallel,
        }
    }
}

/// Significance level must lie strictly between 0 and 1.
pub fn resolve_alpha(alpha: f64, advisories: &mut Vec<Advisory>) -> f64 {
    if alpha.is_finite() && alpha > 0.0 && alpha < 1.0 {
        return alpha;
    }
    advisories.push(fallback("alpha", alpha, DEFAULT_ALPHA));
    DEFAULT_ALPHA
}

pub fn resolve_top_k(top_k: usize, advisories: &mut Vec<Advisory>) -> usize {
    if top_k >= MIN_TOP_K {
        return top_k;
    }
    advisories.push(fallback("top_k", top_k, DEFAULT_TOP_K));
    DEFAULT_TOP_K
}

/// Correlation thresholds are compared against |r|, so anything beyond 1 in magnitude is unusable.
pub fn resolve_threshold(threshold: f64, advisories: &mut Vec<Advisory>) -> f64 {
    if threshold.is_finite() && threshold.abs() <= 1.0 {
        return threshold;
    }
    advisories.push(fallback(
        "correlation_threshold",
        threshold,
        DEFAULT_CORRELATION_THRESHOLD,
    ));
    DEFAULT_CORRELATION_THRESHOLD
}

fn fallback<S, F>(parameter: &'static str, supplied: S, default: F) -> Advisory
where
    S: ToString,
    F: ToString,
{
    Advisory::ConfigFallback {
        parameter,
        supplied: supplied.to_string(),
        fallback: default.to_string(),
    }
    .emit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_bounds() {
        let mut advisories = Vec::new();
        assert_eq!(resolve_alpha(0.05, &mut advisories), 0.05);
        assert!(advisories.is_empty());

        for bad in [0.0, 1.0, -0.2, 3.0, f64::NAN, f64::INFINITY] {
            assert_eq!(resolve_alpha(bad, &mut advisories), DEFAULT_ALPHA);
        }
        assert_eq!(advisories.len(), 6);
        assert!(advisories.iter().all(Advisory::is_config_fallback));
    }

    #[test]
    fn test_top_k_minimum() {
        let mut advisories = Vec::new();
        assert_eq!(resolve_top_k(2, &mut advisories), 2);
        assert_eq!(resolve_top_k(40, &mut advisories), 40);
        assert!(advisories.is_empty());

        assert_eq!(resolve_top_k(1, &mut advisories), DEFAULT_TOP_K);
        assert_eq!(resolve_top_k(0, &mut advisories), DEFAULT_TOP_K);
        assert_eq!(advisories.len(), 2);
    }

    #[test]
    fn test_threshold_magnitude() {
        let mut advisories = Vec::new();
        assert_eq!(resolve_threshold(-1.0, &mut advisories), -1.0);
        assert_eq!(resolve_threshold(1.0, &mut advisories), 1.0);
        assert!(advisories.is_empty());

        assert_eq!(
            resolve_threshold(1.5, &mut advisories),
            DEFAULT_CORRELATION_THRESHOLD
        );
        assert_eq!(
            advisories,
            vec![Advisory::ConfigFallback {
                parameter: "correlation_threshold",
                supplied: "1.5".to_string(),
                fallback: "0.7".to_string(),
            }]
        );
    }

    #[test]
    fn test_resolved_config() {
        let config = AnalysisConfig::default()
            .with_alpha(2.0)
            .with_top_k(1)
            .with_correlation_threshold(0.9);
        let mut advisories = Vec::new();
        let resolved = config.resolved(&mut advisories);

        assert_eq!(resolved.alpha, DEFAULT_ALPHA);
        assert_eq!(resolved.top_k, DEFAULT_TOP_K);
        assert_eq!(resolved.correlation_threshold, 0.9);
        assert_eq!(resolved.control_group, "normal");
        assert_eq!(advisories.len(), 2);
    }
}
