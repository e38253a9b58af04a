//! Moments used by the effect-size families.
//!
//! Degenerate inputs are not special-cased: an empty slice has a NaN mean
//! and fewer than two values give a NaN sample variance.

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with N-1 in the denominator.
pub fn sample_variance(values: &[f64]) -> f64 {
    let m = mean(values);
    let ss: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    ss / (values.len() as f64 - 1.0)
}

/// Sum of squared deviations from the mean.
pub fn sum_of_squares(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(2)).sum()
}
