use anyhow::{Result, anyhow};
use std::cmp::Ordering;

/// Multiple testing correction applied to one group's per-feature p-values before they are
/// compared with the significance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Correction {
    /// Compare raw p-values directly
    #[default]
    None,
    /// Family-wise error control, multiplies every p-value by the number of tests
    Bonferroni,
    /// False discovery rate control (step-up procedure)
    BenjaminiHochberg,
}

impl Correction {
    pub fn name(&self) -> &'static str {
        match self {
            Correction::None => "none",
            Correction::Bonferroni => "bonferroni",
            Correction::BenjaminiHochberg => "benjamini_hochberg",
        }
    }

    /// Adjust `p_values`, or return `None` when no correction is configured.
    ///
    /// Undefined (NaN) p-values count as 1.
    pub fn apply(&self, p_values: &[f64]) -> Result<Option<Vec<f64>>> {
        let sanitized: Vec<f64> = p_values
            .iter()
            .map(|&p| if p.is_nan() { 1.0 } else { p })
            .collect();

        match self {
            Correction::None => Ok(None),
            Correction::Bonferroni => bonferroni_correction(&sanitized).map(Some),
            Correction::BenjaminiHochberg => benjamini_hochberg_correction(&sanitized).map(Some),
        }
    }
}

fn validate_p_values(p_values: &[f64]) -> Result<()> {
    if p_values.is_empty() {
        return Err(anyhow!("Empty p-value array"));
    }
    for (i, &p) in p_values.iter().enumerate() {
        if !(0.0..=1.0).contains(&p) {
            return Err(anyhow!("Invalid p-value at index {}: {}", i, p));
        }
    }
    Ok(())
}

/// Apply Bonferroni correction to p-values
///
/// Each p-value is multiplied by the number of tests and capped at 1.
pub fn bonferroni_correction(p_values: &[f64]) -> Result<Vec<f64>> {
    validate_p_values(p_values)?;
    let n = p_values.len() as f64;
    Ok(p_values.iter().map(|&p| (p * n).min(1.0)).collect())
}

/// Apply Benjamini-Hochberg (BH) procedure for controlling false discovery rate
///
/// Adjusted values are made monotone by walking from the largest p-value down and keeping the
/// running minimum of `p * n / rank`.
pub fn benjamini_hochberg_correction(p_values: &[f64]) -> Result<Vec<f64>> {
    validate_p_values(p_values)?;
    let n = p_values.len();

    let mut indexed_p_values: Vec<(usize, f64)> =
        p_values.iter().enumerate().map(|(i, &p)| (i, p)).collect();
    indexed_p_values.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let mut adjusted_p_values = vec![0.0; n];
    let mut current_min: f64 = 1.0;

    for i in (0..n).rev() {
        let (orig_idx, p_val) = indexed_p_values[i];
        let rank = i + 1;

        let adjustment = (p_val * n as f64 / rank as f64).min(1.0);
        current_min = adjustment.min(current_min);
        adjusted_p_values[orig_idx] = current_min;
    }

    Ok(adjusted_p_values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_vec_relative_eq(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len(), "Vectors have different lengths");
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_bonferroni() {
        let adjusted = bonferroni_correction(&[0.01, 0.02, 0.03, 0.1, 0.2]).unwrap();
        assert_vec_relative_eq(&adjusted, &[0.05, 0.1, 0.15, 0.5, 1.0]);
    }

    #[test]
    fn test_benjamini_hochberg() {
        // R: p.adjust(c(0.01, 0.04, 0.03, 0.2), "BH")
        let adjusted = benjamini_hochberg_correction(&[0.01, 0.04, 0.03, 0.2]).unwrap();
        assert_vec_relative_eq(&adjusted, &[0.04, 0.053333333333, 0.053333333333, 0.2]);
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(
            benjamini_hochberg_correction(&[]).unwrap_err().to_string(),
            "Empty p-value array"
        );
        assert!(
            bonferroni_correction(&[0.01, 1.5])
                .unwrap_err()
                .to_string()
                .contains("Invalid p-value at index 1")
        );
    }

    #[test]
    fn test_apply_treats_nan_as_one() {
        assert_eq!(Correction::None.apply(&[0.2]).unwrap(), None);

        let adjusted = Correction::Bonferroni
            .apply(&[0.001, f64::NAN])
            .unwrap()
            .unwrap();
        assert_vec_relative_eq(&adjusted, &[0.002, 1.0]);
    }
}
