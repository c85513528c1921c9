//! In-memory expression table.
//!
//! A [`Dataset`] is a dense samples × features matrix where every sample carries a group
//! label. It is built once and never mutated by the analysis code.

use std::collections::HashMap;

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::PipelineError;
use crate::testing::utils::{extract_unique_groups, get_group_indices};

#[derive(Debug, Clone)]
pub struct Dataset {
    labels: Vec<String>,
    features: Vec<String>,
    feature_index: HashMap<String, usize>,
    values: Array2<f64>,
}

impl Dataset {
    /// Build a dataset from sample labels, feature names and a samples × features matrix.
    ///
    /// Every value must be finite: NaN and infinite levels are rejected.
    pub fn new(
        labels: Vec<String>,
        features: Vec<String>,
        values: Array2<f64>,
    ) -> anyhow::Result<Self> {
        if values.nrows() != labels.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: labels.len(),
                found: values.nrows(),
            }
            .into());
        }
        if values.ncols() != features.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: features.len(),
                found: values.ncols(),
            }
            .into());
        }

        if let Some(((row, col), &value)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(PipelineError::NonFiniteValue {
                row,
                column: features[col].clone(),
                value,
            }
            .into());
        }

        let mut feature_index = HashMap::with_capacity(features.len());
        for (idx, name) in features.iter().enumerate() {
            if feature_index.insert(name.clone(), idx).is_some() {
                return Err(PipelineError::DuplicateFeature {
                    feature: name.clone(),
                }
                .into());
            }
        }

        Ok(Dataset {
            labels,
            features,
            feature_index,
            values,
        })
    }

    /// Build a dataset from `(label, values)` records sharing one feature list.
    pub fn from_records<S>(features: &[S], records: &[(S, Vec<f64>)]) -> anyhow::Result<Self>
    where
        S: AsRef<str>,
    {
        let n_features = features.len();
        let mut labels = Vec::with_capacity(records.len());
        let mut flat = Vec::with_capacity(records.len() * n_features);

        for (label, row) in records {
            if row.len() != n_features {
                return Err(PipelineError::ShapeMismatch {
                    expected: n_features,
                    found: row.len(),
                }
                .into());
            }
            labels.push(label.as_ref().to_string());
            flat.extend_from_slice(row);
        }

        let values = Array2::from_shape_vec((records.len(), n_features), flat)?;
        let features = features.iter().map(|f| f.as_ref().to_string()).collect();
        Dataset::new(labels, features, values)
    }

    /// Build a dataset from an already split text table.
    ///
    /// The column named `label_column` holds the group of each row. The first
    /// `leading_columns` columns carry sample metadata and are skipped (the label column may
    /// be among them); every remaining column is parsed as a numeric feature.
    pub fn from_string_table<S>(
        header: &[S],
        rows: &[Vec<S>],
        label_column: &str,
        leading_columns: usize,
    ) -> anyhow::Result<Self>
    where
        S: AsRef<str>,
    {
        let label_idx = header
            .iter()
            .position(|h| h.as_ref() == label_column)
            .ok_or_else(|| PipelineError::MissingLabelColumn {
                column: label_column.to_string(),
            })?;

        let feature_columns: Vec<usize> = (leading_columns..header.len())
            .filter(|&c| c != label_idx)
            .collect();
        if feature_columns.is_empty() {
            return Err(PipelineError::NoFeatureColumns {
                skipped: leading_columns,
            }
            .into());
        }

        let mut labels = Vec::with_capacity(rows.len());
        let mut flat = Vec::with_capacity(rows.len() * feature_columns.len());
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != header.len() {
                return Err(PipelineError::ShapeMismatch {
                    expected: header.len(),
                    found: row.len(),
                }
                .into());
            }
            labels.push(row[label_idx].as_ref().trim().to_string());
            for &col in &feature_columns {
                let cell = row[col].as_ref().trim();
                let value = cell
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| PipelineError::NonNumericCell {
                        row: row_idx,
                        column: header[col].as_ref().to_string(),
                        value: cell.to_string(),
                    })?;
                flat.push(value);
            }
        }

        let values = Array2::from_shape_vec((rows.len(), feature_columns.len()), flat)?;
        let features = feature_columns
            .iter()
            .map(|&c| header[c].as_ref().to_string())
            .collect();
        Dataset::new(labels, features, values)
    }

    pub fn n_samples(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.n_samples() == 0
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn feature_position(&self, feature: &str) -> Option<usize> {
        self.feature_index.get(feature).copied()
    }

    /// Distinct group labels in order of first appearance.
    pub fn groups(&self) -> Vec<String> {
        extract_unique_groups(&self.labels)
    }

    /// Row indices of the samples labelled `group`.
    pub fn group_indices(&self, group: &str) -> Vec<usize> {
        get_group_indices(&self.labels, group)
    }

    pub fn group_size(&self, group: &str) -> usize {
        self.labels.iter().filter(|l| l.as_str() == group).count()
    }

    /// Samples × features sub-matrix for one group.
    pub fn group_values(&self, group: &str) -> Array2<f64> {
        self.values.select(Axis(0), &self.group_indices(group))
    }

    /// Values of one feature across every sample.
    pub fn feature_values(&self, feature: &str) -> Option<ArrayView1<'_, f64>> {
        self.feature_position(feature)
            .map(|idx| self.values.column(idx))
    }

    /// Per-feature arithmetic mean over the samples of `group`, `None` if the group is empty.
    pub fn group_means(&self, group: &str) -> Option<Array1<f64>> {
        self.group_values(group).mean_axis(Axis(0))
    }
}
