//! Read-only reports over a finished screen: per-feature views across groups and per-group
//! listings of significant features.

use statrs::statistics::Statistics;

use crate::analysis::baseline::Baseline;
use crate::analysis::ranking::percent_of_baseline;
use crate::analysis::significance::SignificanceMatrix;
use crate::data::Dataset;
use crate::error::PipelineError;

/// Summary statistics of one feature over all samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1), NaN for a single value
    pub std_dev: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl DescriptiveStats {
    /// `None` for an empty slice.
    pub fn calculate(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(DescriptiveStats {
            count: values.len(),
            mean: values.iter().mean(),
            std_dev: values.iter().std_dev(),
            min: sorted[0],
            q1: percentile(&sorted, 25.0),
            median: percentile(&sorted, 50.0),
            q3: percentile(&sorted, 75.0),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Percentile of sorted data with linear interpolation between closest ranks.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let k = (p / 100.0) * (sorted.len() - 1) as f64;
    let f = k.floor() as usize;
    let c = k.ceil() as usize;

    if f == c {
        sorted[f]
    } else {
        sorted[f] * (c as f64 - k) + sorted[c] * (k - f as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureGroupEntry {
    pub group: String,
    pub group_mean: f64,
    /// `group_mean / baseline_mean * 100`, `None` when the baseline is zero
    pub percent_of_baseline: Option<f64>,
}

/// How one feature behaves in every case group where it passed the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureReport {
    pub feature: String,
    pub baseline_mean: f64,
    pub groups: Vec<FeatureGroupEntry>,
    pub summary: DescriptiveStats,
}

impl FeatureReport {
    pub fn is_significant_anywhere(&self) -> bool {
        !self.groups.is_empty()
    }
}

pub fn feature_report(
    feature: &str,
    matrix: &SignificanceMatrix,
    baseline: &Baseline,
    dataset: &Dataset,
) -> anyhow::Result<FeatureReport> {
    let unknown = || PipelineError::UnknownFeature {
        feature: feature.to_string(),
    };

    let baseline_mean = baseline.get(feature).ok_or_else(unknown)?;
    let values = dataset.feature_values(feature).ok_or_else(unknown)?.to_vec();
    let summary = DescriptiveStats::calculate(&values).ok_or(PipelineError::EmptyDataset)?;

    let groups = matrix
        .groups_with_feature(feature)
        .into_iter()
        .map(|(group, group_mean)| FeatureGroupEntry {
            group: group.to_string(),
            group_mean,
            percent_of_baseline: percent_of_baseline(group_mean, baseline_mean),
        })
        .collect();

    Ok(FeatureReport {
        feature: feature.to_string(),
        baseline_mean,
        groups,
        summary,
    })
}

/// Significant features of one case group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub group: String,
    pub samples: usize,
    pub significant_features: Vec<String>,
}

impl GroupSummary {
    pub fn count(&self) -> usize {
        self.significant_features.len()
    }
}

/// One summary per case group that has a row in the matrix, in matrix order.
pub fn group_summaries(matrix: &SignificanceMatrix) -> Vec<GroupSummary> {
    matrix
        .rows()
        .iter()
        .filter(|row| !row.is_control())
        .map(|row| GroupSummary {
            group: row.group().to_string(),
            samples: row.samples(),
            significant_features: row
                .entries()
                .map(|(idx, _)| matrix.features()[idx].clone())
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_describe_matches_linear_quantiles() {
        // pandas: Series([12, 15, 15, 9, 10]).describe()
        let stats = DescriptiveStats::calculate(&[12.0, 15.0, 15.0, 9.0, 10.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert_relative_eq!(stats.mean, 12.2, epsilon = 1e-12);
        assert_relative_eq!(stats.std_dev, 2.774887385102321, epsilon = 1e-12);
        assert_eq!(stats.min, 9.0);
        assert_eq!(stats.q1, 10.0);
        assert_eq!(stats.median, 12.0);
        assert_eq!(stats.q3, 15.0);
        assert_eq!(stats.max, 15.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        assert_relative_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 25.0), 1.75);
        assert_relative_eq!(percentile(&[1.0, 2.0, 3.0, 4.0], 50.0), 2.5);
        assert_eq!(percentile(&[7.0], 75.0), 7.0);
        assert!(DescriptiveStats::calculate(&[]).is_none());
    }
}
