use num_traits::Float;
use std::collections::HashMap;

pub mod correction;
pub mod inference;

pub mod utils;

#[derive(Debug, Clone)]
pub struct TestResult<T> {
    /// The test statistic value (e.g., F statistic)
    pub statistic: T,
    /// The p-value of the test
    pub p_value: T,
    /// Numerator and denominator degrees of freedom (for variance-ratio tests)
    pub degrees_of_freedom: Option<(T, T)>,
    /// Additional test-specific information
    pub metadata: HashMap<String, T>,
}

impl<T> TestResult<T>
where
    T: Float,
{
    /// Create a new test result with minimal information
    pub fn new(statistic: T, p_value: T) -> Self {
        TestResult {
            statistic,
            p_value,
            degrees_of_freedom: None,
            metadata: HashMap::new(),
        }
    }

    /// Result of a test that could not be carried out: undefined statistic, p-value of one
    pub fn undefined() -> Self {
        TestResult::new(T::nan(), T::one())
    }

    /// Add degrees of freedom to the result
    pub fn with_degrees_of_freedom(mut self, df_between: T, df_within: T) -> Self {
        self.degrees_of_freedom = Some((df_between, df_within));
        self
    }

    /// Add additional metadata
    pub fn with_metadata(mut self, key: &str, value: T) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct MultipleTestResults<T> {
    /// Test statistics for each feature/gene
    pub statistics: Vec<T>,
    /// Raw (unadjusted) p-values
    pub p_values: Vec<T>,
    /// Adjusted p-values (after multiple testing correction)
    pub adjusted_p_values: Option<Vec<T>>,
    /// Global metadata about the test
    pub global_metadata: HashMap<String, String>,
}

impl<T> MultipleTestResults<T>
where
    T: Float,
{
    /// Create a new results object from p-values
    pub fn new(statistics: Vec<T>, p_values: Vec<T>) -> Self {
        MultipleTestResults {
            statistics,
            p_values,
            adjusted_p_values: None,
            global_metadata: HashMap::new(),
        }
    }

    pub fn from_results(results: &[TestResult<T>]) -> Self {
        let statistics = results.iter().map(|r| r.statistic).collect();
        let p_values = results.iter().map(|r| r.p_value).collect();
        MultipleTestResults::new(statistics, p_values)
    }

    /// Add adjusted p-values to the results
    pub fn with_adjusted_p_values(mut self, adjusted_p_values: Vec<T>) -> Self {
        self.adjusted_p_values = Some(adjusted_p_values);
        self
    }

    /// Add global metadata about the test
    pub fn with_global_metadata(mut self, key: &str, value: &str) -> Self {
        self.global_metadata
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.p_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p_values.is_empty()
    }

    /// The p-values thresholds are applied to: adjusted if present, raw otherwise
    pub fn effective_p_values(&self) -> &[T] {
        match &self.adjusted_p_values {
            Some(adj_p) => adj_p,
            None => &self.p_values,
        }
    }

    /// Get indices of significant features at the given threshold (p strictly below alpha)
    pub fn significant_indices(&self, alpha: T) -> Vec<usize> {
        self.effective_p_values()
            .iter()
            .enumerate()
            .filter_map(|(i, &p)| if p < alpha { Some(i) } else { None })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significant_indices_prefer_adjusted() {
        let results = MultipleTestResults::new(vec![5.0, 1.0, 9.0], vec![0.004, 0.2, 0.009]);
        assert_eq!(results.significant_indices(0.01), vec![0, 2]);

        let adjusted = results.with_adjusted_p_values(vec![0.012, 0.2, 0.009]);
        assert_eq!(adjusted.significant_indices(0.01), vec![2]);
    }

    #[test]
    fn test_nan_p_value_never_significant() {
        let results = MultipleTestResults::new(vec![f64::NAN], vec![f64::NAN]);
        assert!(results.significant_indices(0.5).is_empty());
        let undefined = TestResult::<f64>::undefined();
        assert!(undefined.statistic.is_nan());
        assert_eq!(undefined.p_value, 1.0);
    }
}
