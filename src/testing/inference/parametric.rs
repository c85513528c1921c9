//! Parametric statistical tests for expression tables.
//!
//! This module implements the one-way analysis of variance used to screen features. The
//! table-level entry point tests every feature column of a samples × features matrix between
//! two sets of rows, which is how case groups are compared to the control group.

use ndarray::{Array2, Axis};
use num_traits::Float;
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::testing::TestResult;

/// Perform one-way ANOVA on every feature (column) comparing two sets of samples (rows).
///
/// # Arguments
///
/// * `matrix` - Expression matrix (samples × features)
/// * `group1_indices` - Row indices of the first group
/// * `group2_indices` - Row indices of the second group
///
/// # Returns
///
/// Vector of `TestResult` objects, one per feature, containing F statistics and p-values.
pub fn anova_matrix_groups(
    matrix: &Array2<f64>,
    group1_indices: &[usize],
    group2_indices: &[usize],
) -> anyhow::Result<Vec<TestResult<f64>>> {
    if group1_indices.is_empty() || group2_indices.is_empty() {
        return Err(anyhow::anyhow!("Group indices cannot be empty"));
    }

    let group1 = matrix.select(Axis(0), group1_indices);
    let group2 = matrix.select(Axis(0), group2_indices);

    let results = group1
        .axis_iter(Axis(1))
        .zip(group2.axis_iter(Axis(1)))
        .map(|(x, y)| {
            let x = x.to_vec();
            let y = y.to_vec();
            one_way_anova(&[x.as_slice(), y.as_slice()])
        })
        .collect();

    Ok(results)
}

/// Perform a one-way analysis of variance across any number of samples.
///
/// Means are computed first and squared deviations accumulated in a second pass, which keeps
/// constant groups at an exact zero within-group variance.
///
/// # Returns
///
/// `TestResult` containing the F statistic, its p-value and the (between, within) degrees of
/// freedom. Tests that cannot be carried out report an undefined statistic and a p-value of 1.
pub fn one_way_anova<T>(groups: &[&[T]]) -> TestResult<f64>
where
    T: Float,
{
    let groups: Vec<Vec<f64>> = groups
        .iter()
        .filter(|g| !g.is_empty())
        .map(|g| g.iter().map(|v| v.to_f64().unwrap_or(f64::NAN)).collect())
        .collect();

    let k = groups.len();
    let n_total: usize = groups.iter().map(Vec::len).sum();
    if k < 2 || n_total <= k {
        return TestResult::undefined();
    }

    let grand_mean = groups.iter().flatten().sum::<f64>() / n_total as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in &groups {
        let n = group.len() as f64;
        let mean = group.iter().sum::<f64>() / n;
        ss_between += n * (mean - grand_mean).powi(2);
        ss_within += group.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    }

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;
    f_test_from_squares(ss_between, ss_within, df_between, df_within)
}

fn f_test_from_squares(
    ss_between: f64,
    ss_within: f64,
    df_between: f64,
    df_within: f64,
) -> TestResult<f64> {
    if !ss_between.is_finite() || !ss_within.is_finite() {
        return TestResult::undefined();
    }

    if ss_within == 0.0 {
        // No spread inside any group: separated means are infinitely significant,
        // identical means carry no information.
        return if ss_between > 0.0 {
            TestResult::new(f64::INFINITY, 0.0).with_degrees_of_freedom(df_between, df_within)
        } else {
            TestResult::<f64>::undefined().with_degrees_of_freedom(df_between, df_within)
        };
    }

    let f_stat = (ss_between / df_between) / (ss_within / df_within);
    let p_value = f_test_p_value(f_stat, df_between, df_within);

    TestResult::new(f_stat, p_value)
        .with_degrees_of_freedom(df_between, df_within)
        .with_metadata("ss_between", ss_between)
        .with_metadata("ss_within", ss_within)
}

#[inline]
fn f_test_p_value(f_stat: f64, df_between: f64, df_within: f64) -> f64 {
    if f_stat.is_nan() {
        return 1.0;
    }
    if f_stat.is_infinite() {
        return 0.0;
    }
    if f_stat <= 0.0 {
        return 1.0;
    }

    match FisherSnedecor::new(df_between, df_within) {
        Ok(dist) => dist.sf(f_stat).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_matrix_columns_are_tested_independently() {
        let matrix = ndarray::array![
            [1.0, 5.0],
            [2.0, 6.0],
            [3.0, 7.0],
            [7.0, 5.0],
            [8.0, 6.0],
            [9.0, 7.0]
        ];
        let results = anova_matrix_groups(&matrix, &[0, 1, 2], &[3, 4, 5]).unwrap();

        assert_eq!(results.len(), 2);
        assert_relative_eq!(results[0].statistic, 54.0, epsilon = 1e-10);
        assert_eq!(results[1].statistic, 0.0);
        assert_eq!(results[1].p_value, 1.0);
        assert!(anova_matrix_groups(&matrix, &[], &[3]).is_err());
    }

    #[test]
    fn test_empty_groups_are_ignored() {
        let empty: [f64; 0] = [];
        let result = one_way_anova(&[&[1.0, 2.0][..], &empty[..]]);
        assert!(result.statistic.is_nan());
        assert_eq!(result.p_value, 1.0);
    }
}
