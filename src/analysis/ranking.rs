//! Top-k ranking of significant features by deviation from the control baseline.

use std::cmp::Ordering;

use crate::analysis::baseline::Baseline;
use crate::analysis::significance::SignificanceMatrix;
use crate::config::resolve_top_k;
use crate::error::{Advisory, PipelineError};

#[derive(Debug, Clone, PartialEq)]
pub struct RankedFeature {
    pub feature: String,
    pub group_mean: f64,
    pub baseline_mean: f64,
    /// |group mean − baseline mean|
    pub deviation: f64,
}

impl RankedFeature {
    /// Group mean as a percentage of the control mean.
    ///
    /// Presentation only; `None` when the control mean is zero or either mean is not finite.
    pub fn percent_of_baseline(&self) -> Option<f64> {
        percent_of_baseline(self.group_mean, self.baseline_mean)
    }
}

pub(crate) fn percent_of_baseline(group_mean: f64, baseline_mean: f64) -> Option<f64> {
    if baseline_mean == 0.0 || !baseline_mean.is_finite() || !group_mean.is_finite() {
        return None;
    }
    Some(group_mean / baseline_mean * 100.0)
}

/// Features of one group ordered by decreasing deviation, at most `k` long.
///
/// An empty ranking is a valid outcome: the group exists but nothing passed the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub group: String,
    /// The ranking size actually applied
    pub k: usize,
    pub entries: Vec<RankedFeature>,
    pub advisories: Vec<Advisory>,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn features(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.feature.as_str()).collect()
    }
}

/// Rank the significant features of `group` by absolute deviation from the baseline.
///
/// `k` below 2 falls back to 5. Ties keep feature order.
///
/// # Errors
///
/// [`PipelineError::UnknownGroup`] if `group` has no row in the matrix.
pub fn rank(
    group: &str,
    matrix: &SignificanceMatrix,
    baseline: &Baseline,
    k: usize,
) -> anyhow::Result<Ranking> {
    let mut advisories = Vec::new();
    let k = resolve_top_k(k, &mut advisories);

    let row = matrix
        .row(group)
        .ok_or_else(|| PipelineError::UnknownGroup {
            group: group.to_string(),
        })?;

    let mut entries = Vec::with_capacity(row.len());
    for (idx, group_mean) in row.entries() {
        let feature = &matrix.features()[idx];
        let baseline_mean = baseline
            .get(feature)
            .ok_or_else(|| PipelineError::UnknownFeature {
                feature: feature.clone(),
            })?;
        entries.push(RankedFeature {
            feature: feature.clone(),
            group_mean,
            baseline_mean,
            deviation: (group_mean - baseline_mean).abs(),
        });
    }

    // stable: equal deviations keep feature order
    entries.sort_by(|a, b| {
        b.deviation
            .partial_cmp(&a.deviation)
            .unwrap_or(Ordering::Equal)
    });
    entries.truncate(k);

    log::debug!(
        "'{}': {} of {} significant feature(s) ranked",
        group,
        entries.len(),
        row.len()
    );

    Ok(Ranking {
        group: group.to_string(),
        k,
        entries,
        advisories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_of_baseline_guards_zero() {
        assert_eq!(percent_of_baseline(15.0, 10.0), Some(150.0));
        assert_eq!(percent_of_baseline(15.0, 0.0), None);
        assert_eq!(percent_of_baseline(f64::NAN, 2.0), None);
    }
}
