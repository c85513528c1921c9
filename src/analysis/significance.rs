//! Per-group significance screening against the control group.
//!
//! Every case group with at least two samples is compared to the control group feature by
//! feature with a one-way ANOVA. Only features whose p-value falls strictly below the
//! significance level keep their group mean in the resulting [`SignificanceMatrix`]. The
//! control group itself is recorded in full and serves as the reference row.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::config::{DEFAULT_CONTROL_GROUP, resolve_alpha};
use crate::data::Dataset;
use crate::error::{Advisory, PipelineError};
use crate::testing::MultipleTestResults;
use crate::testing::correction::Correction;
use crate::testing::inference::MatrixStatTests;

/// Group means of the features that passed the screen, keyed by feature position.
#[derive(Debug, Clone)]
pub struct SignificanceRow {
    group: String,
    is_control: bool,
    samples: usize,
    means: BTreeMap<usize, f64>,
    tests: Option<MultipleTestResults<f64>>,
}

impl SignificanceRow {
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn is_control(&self) -> bool {
        self.is_control
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Number of recorded features.
    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    pub fn get(&self, feature_idx: usize) -> Option<f64> {
        self.means.get(&feature_idx).copied()
    }

    /// `(feature position, group mean)` in feature order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.means.iter().map(|(&idx, &mean)| (idx, mean))
    }

    /// Per-feature test results; `None` for the control row.
    pub fn tests(&self) -> Option<&MultipleTestResults<f64>> {
        self.tests.as_ref()
    }
}

/// Sparse (group, feature) → mean table produced by [`SignificanceFilter`].
///
/// A missing entry means "not significant", never zero.
#[derive(Debug, Clone)]
pub struct SignificanceMatrix {
    control: String,
    alpha: f64,
    features: Vec<String>,
    rows: Vec<SignificanceRow>,
    advisories: Vec<Advisory>,
}

impl SignificanceMatrix {
    pub fn control(&self) -> &str {
        &self.control
    }

    /// The significance level actually applied.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn feature_position(&self, feature: &str) -> Option<usize> {
        self.features.iter().position(|f| f == feature)
    }

    /// Groups that have a row, in order of first appearance in the dataset.
    pub fn groups(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(|r| r.group.as_str())
    }

    pub fn rows(&self) -> &[SignificanceRow] {
        &self.rows
    }

    pub fn row(&self, group: &str) -> Option<&SignificanceRow> {
        self.rows.iter().find(|r| r.group == group)
    }

    pub fn control_row(&self) -> Option<&SignificanceRow> {
        self.rows.iter().find(|r| r.is_control)
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.row(group).is_some()
    }

    /// Mean of `feature` in `group` if it passed the screen.
    pub fn get(&self, group: &str, feature: &str) -> Option<f64> {
        let idx = self.feature_position(feature)?;
        self.row(group)?.get(idx)
    }

    /// Names of the recorded features of `group`, `None` if the group has no row.
    pub fn significant_features(&self, group: &str) -> Option<Vec<&str>> {
        self.row(group).map(|row| {
            row.entries()
                .map(|(idx, _)| self.features[idx].as_str())
                .collect()
        })
    }

    /// Case groups in which `feature` is significant, with their means.
    pub fn groups_with_feature(&self, feature: &str) -> Vec<(&str, f64)> {
        let Some(idx) = self.feature_position(feature) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter(|r| !r.is_control)
            .filter_map(|r| r.get(idx).map(|mean| (r.group.as_str(), mean)))
            .collect()
    }

    /// Conditions absorbed while screening (alpha fallback, skipped groups).
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }
}

#[derive(Debug, Clone)]
pub struct SignificanceFilter {
    control: String,
    alpha: f64,
    correction: Correction,
    parallel: bool,
}

enum GroupOutcome {
    Row(SignificanceRow),
    Skipped { group: String, samples: usize },
}

impl SignificanceFilter {
    pub fn new(control: &str, alpha: f64) -> Self {
        SignificanceFilter {
            control: control.to_string(),
            alpha,
            correction: Correction::None,
            parallel: true,
        }
    }

    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.correction = correction;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Screen every group of `dataset` against the control group.
    ///
    /// # Errors
    ///
    /// [`PipelineError::EmptyDataset`] if the dataset has no rows and
    /// [`PipelineError::MissingControl`] if no sample carries the control label.
    pub fn filter(&self, dataset: &Dataset) -> anyhow::Result<SignificanceMatrix> {
        if dataset.is_empty() {
            return Err(PipelineError::EmptyDataset.into());
        }

        let mut advisories = Vec::new();
        let alpha = resolve_alpha(self.alpha, &mut advisories);

        let control_indices = dataset.group_indices(&self.control);
        if control_indices.is_empty() {
            return Err(PipelineError::MissingControl {
                control: self.control.clone(),
            }
            .into());
        }

        let groups = dataset.groups();
        let screen = |group: &String| self.screen_group(dataset, group, &control_indices, alpha);
        let outcomes: Vec<GroupOutcome> = if self.parallel {
            groups.par_iter().map(screen).collect::<anyhow::Result<_>>()?
        } else {
            groups.iter().map(screen).collect::<anyhow::Result<_>>()?
        };

        let mut rows = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                GroupOutcome::Row(row) => {
                    log::debug!(
                        "'{}': {} of {} features recorded",
                        row.group,
                        row.len(),
                        dataset.n_features()
                    );
                    rows.push(row);
                }
                GroupOutcome::Skipped { group, samples } => {
                    advisories.push(Advisory::InsufficientSamples { group, samples }.emit());
                }
            }
        }

        log::info!(
            "screened {} group(s) against '{}' at alpha={}; {} row(s) recorded",
            groups.len(),
            self.control,
            alpha,
            rows.len()
        );

        Ok(SignificanceMatrix {
            control: self.control.clone(),
            alpha,
            features: dataset.features().to_vec(),
            rows,
            advisories,
        })
    }

    fn screen_group(
        &self,
        dataset: &Dataset,
        group: &str,
        control_indices: &[usize],
        alpha: f64,
    ) -> anyhow::Result<GroupOutcome> {
        let group_indices = dataset.group_indices(group);
        let samples = group_indices.len();
        let Some(group_means) = dataset.group_means(group) else {
            return Ok(GroupOutcome::Skipped {
                group: group.to_string(),
                samples,
            });
        };

        if group == self.control {
            return Ok(GroupOutcome::Row(SignificanceRow {
                group: group.to_string(),
                is_control: true,
                samples,
                means: group_means.iter().copied().enumerate().collect(),
                tests: None,
            }));
        }

        if samples <= 1 {
            return Ok(GroupOutcome::Skipped {
                group: group.to_string(),
                samples,
            });
        }

        let tests = dataset.values().differential_expression(
            &group_indices,
            control_indices,
            self.correction,
        )?;

        let means = tests
            .significant_indices(alpha)
            .into_iter()
            .map(|idx| (idx, group_means[idx]))
            .collect();

        Ok(GroupOutcome::Row(SignificanceRow {
            group: group.to_string(),
            is_control: false,
            samples,
            means,
            tests: Some(tests),
        }))
    }
}

/// Screen `dataset` against the conventional `"normal"` control group.
pub fn filter(dataset: &Dataset, alpha: f64) -> anyhow::Result<SignificanceMatrix> {
    SignificanceFilter::new(DEFAULT_CONTROL_GROUP, alpha).filter(dataset)
}
