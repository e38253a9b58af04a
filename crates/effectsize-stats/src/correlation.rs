//! Pairwise Pearson correlation between metric columns.

use effectsize_core::DataTable;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::info;

use crate::descriptive::mean;
use crate::errors::{Result, StatsError};
use crate::float_format;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CorrelationDirection {
    Positive,
    Negative,
    #[serde(rename = "No correlation")]
    NoCorrelation,
}

impl CorrelationDirection {
    /// `NaN` has no direction.
    pub fn classify(r: f64) -> Self {
        if r > 0.0 {
            CorrelationDirection::Positive
        } else if r < 0.0 {
            CorrelationDirection::Negative
        } else {
            CorrelationDirection::NoCorrelation
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CorrelationDirection::Positive => "Positive",
            CorrelationDirection::Negative => "Negative",
            CorrelationDirection::NoCorrelation => "No correlation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub fn classify(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude >= 0.7 {
            CorrelationStrength::Strong
        } else if magnitude >= 0.3 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CorrelationStrength::Strong => "Strong",
            CorrelationStrength::Moderate => "Moderate",
            CorrelationStrength::Weak => "Weak",
        }
    }
}

/// Pearson coefficient with its two-tailed p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pearson {
    pub r: f64,
    pub p_value: f64,
}

/// One correlated pair of metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CorrelationRow {
    #[serde(rename = "Variable 1")]
    pub variable_1: String,
    #[serde(rename = "Variable 2")]
    pub variable_2: String,
    #[serde(rename = "Pearson's r", with = "float_format")]
    #[schemars(with = "float_format::ReportFloat")]
    pub pearson_r: f64,
    #[serde(rename = "P-value", with = "float_format")]
    #[schemars(with = "float_format::ReportFloat")]
    pub p_value: f64,
    #[serde(rename = "Direction")]
    pub direction: CorrelationDirection,
    #[serde(rename = "Strength")]
    pub strength: CorrelationStrength,
}

/// Pearson's r and its two-tailed p-value under `H0: rho = 0`.
///
/// Requires at least two paired observations. A constant input has no
/// defined correlation and yields NaN for both values.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<Pearson> {
    if x.len() != y.len() {
        return Err(StatsError::InsufficientData(format!(
            "paired samples differ in length: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(StatsError::InsufficientData(format!(
            "correlation needs at least 2 observations, got {n}"
        )));
    }

    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let r = sxy / (sxx * syy).sqrt();
    let r = if r.is_nan() { r } else { r.clamp(-1.0, 1.0) };

    let p_value = if r.is_nan() {
        f64::NAN
    } else if n == 2 {
        1.0
    } else {
        let df = (n - 2) as f64;
        student_t_two_tailed(r * (df / (1.0 - r * r)).sqrt(), df)
    };

    Ok(Pearson { r, p_value })
}

/// Two-tailed p-value of a t statistic with `df` degrees of freedom.
pub fn student_t_two_tailed(t: f64, df: f64) -> f64 {
    if t.is_nan() || df.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    StudentsT::new(0.0, 1.0, df)
        .map(|dist| (2.0 * dist.sf(t.abs())).min(1.0))
        .unwrap_or(f64::NAN)
}

/// Pearson correlation for every unordered pair of metric columns.
///
/// Pairs are `(i, j)` with `i < j` in the given column order.
pub fn correlations(table: &DataTable, metric_columns: &[&str]) -> Result<Vec<CorrelationRow>> {
    let mut rows = Vec::new();

    for (i, first) in metric_columns.iter().enumerate() {
        let x = table.numeric(first)?;
        for second in &metric_columns[i + 1..] {
            let y = table.numeric(second)?;
            let Pearson { r, p_value } = pearson(x, y)?;
            rows.push(CorrelationRow {
                variable_1: first.to_string(),
                variable_2: second.to_string(),
                pearson_r: r,
                p_value,
                direction: CorrelationDirection::classify(r),
                strength: CorrelationStrength::classify(r),
            });
        }
    }

    info!(metrics = metric_columns.len(), rows = rows.len(), "correlations computed");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_correlation() {
        let result = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).unwrap();
        assert!((result.r - 1.0).abs() < 1e-12);
        assert!(result.p_value < 1e-12);
    }

    #[test]
    fn known_p_value() {
        // r = 0.8 with n = 5: t = 0.8 * sqrt(3 / 0.36) = 2.3094, p ~= 0.1041
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 3.0, 2.0, 5.0, 4.0];
        let result = pearson(&x, &y).unwrap();
        assert!((result.r - 0.8).abs() < 1e-12);
        assert!((result.p_value - 0.1041).abs() < 1e-3);
    }

    #[test]
    fn t_tail_matches_reference_values() {
        // t = 2.228 is the 97.5% quantile at df = 10.
        assert!((student_t_two_tailed(2.228, 10.0) - 0.05).abs() < 1e-3);
        assert!((student_t_two_tailed(0.0, 10.0) - 1.0).abs() < 1e-12);
        assert_eq!(student_t_two_tailed(f64::NEG_INFINITY, 4.0), 0.0);
        assert!(student_t_two_tailed(1.0, 0.0).is_nan());
    }

    #[test]
    fn two_observations_have_unit_p_value() {
        let result = pearson(&[1.0, 2.0], &[3.0, 1.0]).unwrap();
        assert!((result.r + 1.0).abs() < 1e-12);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn constant_input_is_nan() {
        let result = pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!(result.r.is_nan());
        assert!(result.p_value.is_nan());
        assert_eq!(
            CorrelationDirection::classify(result.r),
            CorrelationDirection::NoCorrelation
        );
        assert_eq!(CorrelationStrength::classify(result.r), CorrelationStrength::Weak);
    }

    #[test]
    fn too_few_observations() {
        let err = pearson(&[1.0], &[2.0]).unwrap_err();
        assert!(matches!(err, StatsError::InsufficientData(_)));
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(CorrelationStrength::classify(0.7), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::classify(-0.69), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::classify(0.3), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::classify(0.29), CorrelationStrength::Weak);
        assert_eq!(CorrelationDirection::classify(-0.01), CorrelationDirection::Negative);
        assert_eq!(CorrelationDirection::classify(0.0), CorrelationDirection::NoCorrelation);
        assert_eq!(CorrelationDirection::NoCorrelation.label(), "No correlation");
    }
}
