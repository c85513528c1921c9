//! # expression-contrast
//!
//! Statistical screening of labelled expression tables against a control group.
//!
//! Given samples labelled by group (tumour types plus one control tissue) and one numeric
//! column per probe, this crate finds the probes whose expression differs significantly
//! between each case group and the control, ranks them by how far they move away from the
//! control level, and measures how the top-ranked probes co-vary inside a group.
//!
//! ## Core Features
//!
//! - **Significance screening**: one-way ANOVA per feature against the control group, with
//!   optional Bonferroni or Benjamini-Hochberg correction
//! - **Baseline**: control-group mean of every feature
//! - **Top-k ranking**: significant features ordered by absolute deviation from the baseline
//! - **Co-expression**: Pearson correlation among ranked features and threshold-based pair
//!   extraction
//!
//! ## Quick Start
//!
//! Build a [`data::Dataset`], then an [`analysis::AnalysisContext`] with an
//! [`config::AnalysisConfig`]; query it with `rank`, `correlate` and `feature_report`.
//! Out-of-range parameters fall back to their defaults and are reported as
//! [`error::Advisory`] values rather than errors.
//!
//! ## Module Organization
//!
//! - **[`analysis`]**: the screening, ranking and correlation pipeline
//! - **[`testing`]**: statistical tests and multiple testing correction
//! - **[`data`]**: the in-memory expression table
//! - **[`config`]**: analysis parameters and their fallbacks
//! - **[`error`]**: fatal errors and non-fatal advisories

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod testing;
