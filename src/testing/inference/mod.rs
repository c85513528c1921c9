use ndarray::Array2;

use crate::testing::correction::Correction;
use crate::testing::{MultipleTestResults, TestResult};

pub mod parametric;

pub trait MatrixStatTests {
    /// One-way ANOVA per feature between two sets of sample rows.
    fn anova_test(
        &self,
        group1_indices: &[usize],
        group2_indices: &[usize],
    ) -> anyhow::Result<Vec<TestResult<f64>>>;

    /// Compare one group of rows to a reference group of rows across every feature.
    fn differential_expression(
        &self,
        group_indices: &[usize],
        reference_indices: &[usize],
        correction: Correction,
    ) -> anyhow::Result<MultipleTestResults<f64>>;
}

impl MatrixStatTests for Array2<f64> {
    fn anova_test(
        &self,
        group1_indices: &[usize],
        group2_indices: &[usize],
    ) -> anyhow::Result<Vec<TestResult<f64>>> {
        parametric::anova_matrix_groups(self, group1_indices, group2_indices)
    }

    fn differential_expression(
        &self,
        group_indices: &[usize],
        reference_indices: &[usize],
        correction: Correction,
    ) -> anyhow::Result<MultipleTestResults<f64>> {
        let results = self.anova_test(group_indices, reference_indices)?;
        let tests = MultipleTestResults::from_results(&results)
            .with_global_metadata("test_type", "one_way_anova");

        if tests.is_empty() {
            return Ok(tests);
        }

        match correction.apply(&tests.p_values)? {
            Some(adjusted) => Ok(tests
                .with_adjusted_p_values(adjusted)
                .with_global_metadata("correction", correction.name())),
            None => Ok(tests),
        }
    }
}
