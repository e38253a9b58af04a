//! Partial eta-squared for every (metric, factor) combination.

use effectsize_core::DataTable;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{Result, StatsError};
use crate::float_format;
use crate::model::{AnovaTable, ModelFitter, OlsFitter, anova_for};

/// Qualitative band for an (partial) eta-squared value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum EtaMagnitude {
    #[serde(rename = "Small effect size (< 6%)")]
    Small,
    #[serde(rename = "Medium effect size (6% - 14%)")]
    Medium,
    #[serde(rename = "Large effect size (≥ 14%)")]
    Large,
}

impl EtaMagnitude {
    pub fn interpret(eta_squared: f64) -> Self {
        if eta_squared >= 0.14 {
            EtaMagnitude::Large
        } else if eta_squared >= 0.06 {
            EtaMagnitude::Medium
        } else {
            EtaMagnitude::Small
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EtaMagnitude::Small => "Small effect size (< 6%)",
            EtaMagnitude::Medium => "Medium effect size (6% - 14%)",
            EtaMagnitude::Large => "Large effect size (≥ 14%)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PartialEtaRow {
    #[serde(rename = "Variables")]
    pub variable: String,
    #[serde(rename = "Factor")]
    pub factor: String,
    #[serde(rename = "Partial Eta-squared (ηp²)", with = "float_format")]
    #[schemars(with = "float_format::ReportFloat")]
    pub partial_eta_squared: f64,
    #[serde(rename = "Interpretation")]
    pub interpretation: EtaMagnitude,
}

/// `SS_factor / (SS_factor + SS_error)` from a fitted ANOVA table.
pub fn partial_eta_from_anova(anova: &AnovaTable) -> Result<f64> {
    let factor = anova.factor_row().ok_or_else(|| {
        StatsError::SingularModel(format!("no '{}' row in ANOVA table", anova.formula.factor_term()))
    })?;
    let residual = anova
        .residual_row()
        .ok_or_else(|| StatsError::SingularModel("no residual row in ANOVA table".to_string()))?;
    Ok(factor.sum_sq / (factor.sum_sq + residual.sum_sq))
}

/// Partial eta-squared with the built-in OLS fitter.
pub fn partial_eta_squared(
    table: &DataTable,
    metric_columns: &[&str],
    factor_columns: &[&str],
) -> Result<Vec<PartialEtaRow>> {
    partial_eta_squared_with(&OlsFitter, table, metric_columns, factor_columns)
}

/// Partial eta-squared for every metric against every factor.
///
/// Rows are ordered by metric, then factor. Each combination is fitted on
/// its own renamed copy of `table`; the first fitting error aborts the batch.
pub fn partial_eta_squared_with(
    fitter: &dyn ModelFitter,
    table: &DataTable,
    metric_columns: &[&str],
    factor_columns: &[&str],
) -> Result<Vec<PartialEtaRow>> {
    let mut rows = Vec::with_capacity(metric_columns.len() * factor_columns.len());

    for metric in metric_columns {
        for factor in factor_columns {
            let anova = anova_for(fitter, table, metric, factor)?;
            let value = partial_eta_from_anova(&anova)?;
            rows.push(PartialEtaRow {
                variable: metric.to_string(),
                factor: factor.to_string(),
                partial_eta_squared: value,
                interpretation: EtaMagnitude::interpret(value),
            });
        }
    }

    info!(
        metrics = metric_columns.len(),
        factors = factor_columns.len(),
        rows = rows.len(),
        "partial eta-squared computed"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use effectsize_core::Column;

    use super::*;

    #[test]
    fn eta_bands() {
        assert_eq!(EtaMagnitude::interpret(0.059), EtaMagnitude::Small);
        assert_eq!(EtaMagnitude::interpret(0.06), EtaMagnitude::Medium);
        assert_eq!(EtaMagnitude::interpret(0.139), EtaMagnitude::Medium);
        assert_eq!(EtaMagnitude::interpret(0.14), EtaMagnitude::Large);
        assert_eq!(EtaMagnitude::Large.label(), "Large effect size (≥ 14%)");
    }

    #[test]
    fn reports_original_names() {
        let table = DataTable::new(vec![
            Column::numeric("Weight (g)", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            Column::categorical("diet type", vec!["a", "a", "b", "b", "c", "c"]),
        ])
        .unwrap();
        let rows = partial_eta_squared(&table, &["Weight (g)"], &["diet type"]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].variable, "Weight (g)");
        assert_eq!(rows[0].factor, "diet type");
        assert!((rows[0].partial_eta_squared - 16.0 / 17.5).abs() < 1e-12);
        assert_eq!(rows[0].interpretation, EtaMagnitude::Large);
    }

    #[test]
    fn collision_after_sanitizing_is_an_error() {
        let table = DataTable::new(vec![
            Column::numeric("score (raw)", vec![1.0, 2.0, 3.0, 4.0]),
            Column::numeric("score_raw", vec![4.0, 3.0, 2.0, 1.0]),
            Column::categorical("g", vec!["a", "a", "b", "b"]),
        ])
        .unwrap();
        let err = partial_eta_squared(&table, &["score (raw)"], &["g"]).unwrap_err();
        assert!(matches!(
            err,
            StatsError::Table(effectsize_core::Error::NameCollision { .. })
        ));
    }

    #[test]
    fn single_level_factor_aborts() {
        let table = DataTable::new(vec![
            Column::numeric("y", vec![1.0, 2.0, 3.0]),
            Column::categorical("g", vec!["a", "a", "a"]),
        ])
        .unwrap();
        let err = partial_eta_squared(&table, &["y"], &["g"]).unwrap_err();
        assert!(matches!(err, StatsError::SingularModel(_)));
    }
}
