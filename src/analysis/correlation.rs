//! Co-expression among a group's ranked features.
//!
//! The analyzer restricts the dataset to one group's samples and a chosen feature subset,
//! computes the pairwise Pearson correlation matrix and, when a threshold is configured,
//! extracts the feature pairs whose absolute correlation reaches it. It does not special-case
//! any group name; excluding the control group is left to the caller.

use ndarray::{Array2, Axis};

use crate::config::resolve_threshold;
use crate::data::Dataset;
use crate::error::{Advisory, PipelineError};

/// Symmetric feature × feature Pearson correlations for one group.
///
/// Undefined coefficients (zero variance, fewer than two samples) are stored as NaN and
/// reported as `None` by the accessors.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    group: String,
    features: Vec<String>,
    values: Array2<f64>,
}

impl CorrelationMatrix {
    fn empty(group: &str) -> Self {
        CorrelationMatrix {
            group: group.to_string(),
            features: Vec::new(),
            values: Array2::zeros((0, 0)),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Raw coefficients, NaN where undefined.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn at(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get((i, j)).copied().filter(|r| r.is_finite())
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.features.iter().position(|f| f == a)?;
        let j = self.features.iter().position(|f| f == b)?;
        self.at(i, j)
    }

    fn has_finite_entry(&self) -> bool {
        self.values.iter().any(|r| r.is_finite())
    }
}

/// Two distinct features of one group whose correlation magnitude reached the threshold.
///
/// `first` precedes `second` in the analysed feature subset.
#[derive(Debug, Clone, PartialEq)]
pub struct SignificantPair {
    pub first: String,
    pub second: String,
    pub correlation: f64,
}

impl SignificantPair {
    pub fn contains(&self, feature: &str) -> bool {
        self.first == feature || self.second == feature
    }
}

#[derive(Debug, Clone)]
pub struct CorrelationAnalysis {
    pub group: String,
    pub matrix: CorrelationMatrix,
    pub pairs: Vec<SignificantPair>,
    /// The threshold actually applied, `None` when pair extraction was not requested
    pub threshold: Option<f64>,
    pub advisories: Vec<Advisory>,
}

impl CorrelationAnalysis {
    /// Whether correlation could not be computed meaningfully for the group.
    pub fn is_insufficient(&self) -> bool {
        self.matrix.is_empty()
    }
}

/// Correlation matrix computation with optional pair extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationAnalyzer {
    threshold: Option<f64>,
}

impl CorrelationAnalyzer {
    /// Analyzer that only computes the matrix.
    pub fn new() -> Self {
        CorrelationAnalyzer { threshold: None }
    }

    /// Also report pairs with |r| at or above `threshold` (|threshold| must not exceed 1,
    /// otherwise 0.7 is used).
    pub fn with_pair_extraction(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Correlate `features` over the samples of `group`.
    ///
    /// Fewer than two features, or a matrix without a single finite coefficient, yields an
    /// empty matrix and an [`Advisory::InsufficientCorrelationData`].
    ///
    /// # Errors
    ///
    /// [`PipelineError::UnknownFeature`] if a requested feature is not in the dataset.
    pub fn analyze<S>(
        &self,
        group: &str,
        features: &[S],
        dataset: &Dataset,
    ) -> anyhow::Result<CorrelationAnalysis>
    where
        S: AsRef<str>,
    {
        let mut advisories = Vec::new();
        let threshold = self
            .threshold
            .map(|t| resolve_threshold(t, &mut advisories));

        let mut names: Vec<String> = Vec::with_capacity(features.len());
        let mut columns: Vec<usize> = Vec::with_capacity(features.len());
        for feature in features {
            let feature = feature.as_ref();
            let idx = dataset
                .feature_position(feature)
                .ok_or_else(|| PipelineError::UnknownFeature {
                    feature: feature.to_string(),
                })?;
            if !columns.contains(&idx) {
                names.push(feature.to_string());
                columns.push(idx);
            }
        }

        let analysed = names.len();
        let matrix = if analysed < 2 {
            None
        } else {
            let samples = dataset.group_values(group).select(Axis(1), &columns);
            let matrix = CorrelationMatrix {
                group: group.to_string(),
                features: names,
                values: pearson_matrix(&samples),
            };
            matrix.has_finite_entry().then_some(matrix)
        };

        let Some(matrix) = matrix else {
            advisories.push(
                Advisory::InsufficientCorrelationData {
                    group: group.to_string(),
                    features: analysed,
                }
                .emit(),
            );
            return Ok(CorrelationAnalysis {
                group: group.to_string(),
                matrix: CorrelationMatrix::empty(group),
                pairs: Vec::new(),
                threshold,
                advisories,
            });
        };

        let pairs = match threshold {
            Some(t) => extract_pairs(&matrix, t),
            None => Vec::new(),
        };
        log::debug!(
            "'{}': {} feature(s) correlated, {} pair(s) reported",
            group,
            matrix.len(),
            pairs.len()
        );

        Ok(CorrelationAnalysis {
            group: group.to_string(),
            matrix,
            pairs,
            threshold,
            advisories,
        })
    }
}

fn extract_pairs(matrix: &CorrelationMatrix, threshold: f64) -> Vec<SignificantPair> {
    let n = matrix.len();
    let mut pairs = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if let Some(r) = matrix.at(i, j)
                && r.abs() >= threshold
            {
                pairs.push(SignificantPair {
                    first: matrix.features[i].clone(),
                    second: matrix.features[j].clone(),
                    correlation: r,
                });
            }
        }
    }
    pairs
}

/// Pearson correlation coefficient, NaN when undefined.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n != y.len() || n < 2 {
        return f64::NAN;
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&a, &b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Column-wise correlation of a samples × features matrix.
fn pearson_matrix(samples: &Array2<f64>) -> Array2<f64> {
    let n = samples.ncols();
    let columns: Vec<Vec<f64>> = samples.axis_iter(Axis(1)).map(|c| c.to_vec()).collect();

    let mut values = Array2::from_elem((n, n), f64::NAN);
    for i in 0..n {
        values[[i, i]] = if pearson(&columns[i], &columns[i]).is_nan() {
            f64::NAN
        } else {
            1.0
        };
        for j in (i + 1)..n {
            let r = pearson(&columns[i], &columns[j]);
            values[[i, j]] = r;
            values[[j, i]] = r;
        }
    }
    values
}

/// Correlate `features` within `group` and extract pairs with |r| at or above `threshold`.
pub fn correlate<S>(
    group: &str,
    features: &[S],
    dataset: &Dataset,
    threshold: f64,
) -> anyhow::Result<CorrelationAnalysis>
where
    S: AsRef<str>,
{
    CorrelationAnalyzer::new()
        .with_pair_extraction(threshold)
        .analyze(group, features, dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pearson_reference_values() {
        assert_relative_eq!(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]), 1.0);
        assert_relative_eq!(pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]), -1.0);
        // numpy.corrcoef([1, 2, 3, 4], [1, 3, 2, 4])
        assert_relative_eq!(
            pearson(&[1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 2.0, 4.0]),
            0.8,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_pearson_undefined() {
        assert!(pearson(&[1.0], &[2.0]).is_nan());
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert!(pearson(&[1.0, 2.0], &[1.0]).is_nan());
    }

    #[test]
    fn test_matrix_diagonal() {
        let samples = ndarray::array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0]];
        let values = pearson_matrix(&samples);
        assert_eq!(values[[0, 0]], 1.0);
        assert!(values[[1, 1]].is_nan());
        assert!(values[[0, 1]].is_nan());
    }
}
