//! One-shot pipeline construction and read-only queries.

use crate::analysis::baseline::Baseline;
use crate::analysis::correlation::{CorrelationAnalysis, CorrelationAnalyzer};
use crate::analysis::ranking::{Ranking, rank};
use crate::analysis::report::{FeatureReport, GroupSummary, feature_report, group_summaries};
use crate::analysis::significance::{SignificanceFilter, SignificanceMatrix};
use crate::config::AnalysisConfig;
use crate::data::Dataset;
use crate::error::{Advisory, PipelineError};

/// What a free-text query names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Feature(String),
    Group(String),
}

/// The screened dataset together with everything derived from it.
///
/// Built once by [`AnalysisContext::build`]; every query afterwards is a pure function of
/// this immutable state.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    dataset: Dataset,
    config: AnalysisConfig,
    significance: SignificanceMatrix,
    baseline: Baseline,
    advisories: Vec<Advisory>,
}

impl AnalysisContext {
    /// Validate `config`, screen `dataset` and compute the control baseline.
    ///
    /// # Errors
    ///
    /// [`PipelineError::EmptyDataset`] or [`PipelineError::MissingControl`]; no partial
    /// context is produced.
    pub fn build(dataset: Dataset, config: AnalysisConfig) -> anyhow::Result<Self> {
        if dataset.is_empty() {
            return Err(PipelineError::EmptyDataset.into());
        }

        let mut advisories = Vec::new();
        let config = config.resolved(&mut advisories);

        let significance = SignificanceFilter::new(&config.control_group, config.alpha)
            .with_correction(config.correction)
            .with_parallel(config.parallel)
            .filter(&dataset)?;
        let baseline = Baseline::compute(&dataset, &config.control_group)?;

        advisories.extend(significance.advisories().iter().cloned());

        log::info!(
            "analysis ready: {} sample(s), {} feature(s), {} group(s)",
            dataset.n_samples(),
            dataset.n_features(),
            significance.rows().len()
        );

        Ok(AnalysisContext {
            dataset,
            config,
            significance,
            baseline,
            advisories,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The configuration after fallbacks were applied.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn significance(&self) -> &SignificanceMatrix {
        &self.significance
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Conditions absorbed while building the context.
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// Every group label in the dataset, in order of first appearance.
    pub fn groups(&self) -> Vec<String> {
        self.dataset.groups()
    }

    pub fn case_groups(&self) -> Vec<String> {
        self.dataset
            .groups()
            .into_iter()
            .filter(|g| *g != self.config.control_group)
            .collect()
    }

    pub fn features(&self) -> &[String] {
        self.dataset.features()
    }

    /// Top features of `group` by deviation from the control mean.
    ///
    /// # Errors
    ///
    /// [`PipelineError::UnknownGroup`] for a label absent from the dataset and
    /// [`PipelineError::GroupNotTested`] for a group the screen skipped.
    pub fn rank(&self, group: &str) -> anyhow::Result<Ranking> {
        self.ensure_tested(group)?;
        rank(group, &self.significance, &self.baseline, self.config.top_k)
    }

    /// Correlate the ranked features of `group` and extract co-varying pairs.
    pub fn correlate(&self, group: &str) -> anyhow::Result<CorrelationAnalysis> {
        let ranking = self.rank(group)?;
        CorrelationAnalyzer::new()
            .with_pair_extraction(self.config.correlation_threshold)
            .analyze(group, &ranking.features(), &self.dataset)
    }

    pub fn feature_report(&self, feature: &str) -> anyhow::Result<FeatureReport> {
        feature_report(feature, &self.significance, &self.baseline, &self.dataset)
    }

    pub fn group_summaries(&self) -> Vec<GroupSummary> {
        group_summaries(&self.significance)
    }

    /// Resolve free text to a feature or group name, ignoring case and surrounding blanks.
    ///
    /// Features take precedence when a label and a feature share a name.
    pub fn lookup(&self, text: &str) -> Option<Query> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(feature) = self
            .features()
            .iter()
            .find(|f| f.to_lowercase() == needle)
        {
            return Some(Query::Feature(feature.clone()));
        }

        self.groups()
            .into_iter()
            .find(|g| g.to_lowercase() == needle)
            .map(Query::Group)
    }

    fn ensure_tested(&self, group: &str) -> anyhow::Result<()> {
        if self.significance.contains_group(group) {
            return Ok(());
        }
        let samples = self.dataset.group_size(group);
        if samples == 0 {
            Err(PipelineError::UnknownGroup {
                group: group.to_string(),
            }
            .into())
        } else {
            Err(PipelineError::GroupNotTested {
                group: group.to_string(),
                samples,
            }
            .into())
        }
    }
}
