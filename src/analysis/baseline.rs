//! Control-group reference levels.

use std::collections::HashMap;

use ndarray::Array1;

use crate::config::DEFAULT_CONTROL_GROUP;
use crate::data::Dataset;
use crate::error::PipelineError;

/// Mean expression of every feature over the control samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    control: String,
    features: Vec<String>,
    index: HashMap<String, usize>,
    means: Array1<f64>,
}

impl Baseline {
    /// Compute per-feature control means.
    ///
    /// Fails with [`PipelineError::MissingControl`] if no sample carries the control label.
    pub fn compute(dataset: &Dataset, control: &str) -> anyhow::Result<Self> {
        let means = dataset
            .group_means(control)
            .ok_or_else(|| PipelineError::MissingControl {
                control: control.to_string(),
            })?;

        let features = dataset.features().to_vec();
        let index = features
            .iter()
            .enumerate()
            .map(|(idx, f)| (f.clone(), idx))
            .collect();

        Ok(Baseline {
            control: control.to_string(),
            features,
            index,
            means,
        })
    }

    pub fn control(&self) -> &str {
        &self.control
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.index.get(feature).map(|&idx| self.means[idx])
    }

    /// Control mean by feature position.
    pub fn at(&self, feature_idx: usize) -> Option<f64> {
        self.means.get(feature_idx).copied()
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.features
            .iter()
            .map(String::as_str)
            .zip(self.means.iter().copied())
    }
}

/// Control means for the conventional `"normal"` control group.
pub fn baseline(dataset: &Dataset) -> anyhow::Result<Baseline> {
    Baseline::compute(dataset, DEFAULT_CONTROL_GROUP)
}
