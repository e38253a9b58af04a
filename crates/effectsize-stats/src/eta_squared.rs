//! Eta-squared alongside the full one-way ANOVA decomposition.

use effectsize_core::DataTable;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::Result;
use crate::float_format;
use crate::model::{AnovaTable, ModelFitter, OlsFitter, anova_for};

/// One ANOVA source row tagged with its metric.
///
/// `eta_squared` is only set on the between-group row; residual rows also
/// have no F statistic or p-value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnovaEtaRow {
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(with = "float_format")]
    #[schemars(with = "float_format::ReportFloat")]
    pub sum_sq: f64,
    pub df: f64,
    #[serde(rename = "F", with = "float_format::option")]
    #[schemars(with = "Option<float_format::ReportFloat>")]
    pub f_value: Option<f64>,
    #[serde(rename = "PR(>F)", with = "float_format::option")]
    #[schemars(with = "Option<float_format::ReportFloat>")]
    pub p_value: Option<f64>,
    #[serde(rename = "Eta-squared (η²)", with = "float_format::option")]
    #[schemars(with = "Option<float_format::ReportFloat>")]
    pub eta_squared: Option<f64>,
}

/// First row's sum of squares over the sum of all rows.
pub fn eta_squared_from_anova(anova: &AnovaTable) -> f64 {
    let between = anova.rows.first().map(|row| row.sum_sq).unwrap_or(f64::NAN);
    between / anova.total_sum_sq()
}

/// Eta-squared with the built-in OLS fitter.
pub fn eta_squared(
    table: &DataTable,
    metric_columns: &[&str],
    factor_column: &str,
) -> Result<Vec<AnovaEtaRow>> {
    eta_squared_with(&OlsFitter, table, metric_columns, factor_column)
}

/// One-way ANOVA of every metric on `factor_column`, with eta-squared on
/// the between-group row.
///
/// Tables are concatenated in metric order and keep their own row order.
pub fn eta_squared_with(
    fitter: &dyn ModelFitter,
    table: &DataTable,
    metric_columns: &[&str],
    factor_column: &str,
) -> Result<Vec<AnovaEtaRow>> {
    let mut rows = Vec::new();

    for metric in metric_columns {
        let anova = anova_for(fitter, table, metric, factor_column)?;
        let eta = eta_squared_from_anova(&anova);
        let between = anova.formula.factor_term();

        rows.extend(anova.rows.into_iter().map(|row| AnovaEtaRow {
            metric: metric.to_string(),
            eta_squared: (row.source == between).then_some(eta),
            source: row.source,
            sum_sq: row.sum_sq,
            df: row.df,
            f_value: row.f_value,
            p_value: row.p_value,
        }));
    }

    info!(
        factor = factor_column,
        metrics = metric_columns.len(),
        rows = rows.len(),
        "eta-squared computed"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use effectsize_core::Column;

    use super::*;

    fn table() -> DataTable {
        DataTable::new(vec![
            Column::categorical("group", vec!["a", "a", "b", "b", "c", "c"]),
            Column::numeric("y", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            Column::numeric("Flat (u/s)", vec![1.0, 3.0, 3.0, 1.0, 2.0, 2.0]),
        ])
        .unwrap()
    }

    #[test]
    fn attaches_eta_to_between_row_only() {
        let rows = eta_squared(&table(), &["y"], "group").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source, "C(group)");
        assert!((rows[0].eta_squared.unwrap() - 16.0 / 17.5).abs() < 1e-12);
        assert_eq!(rows[1].source, "Residual");
        assert_eq!(rows[1].eta_squared, None);
        assert_eq!(rows[1].f_value, None);
        assert_eq!(rows[1].p_value, None);
    }

    #[test]
    fn equal_group_means_give_zero_eta() {
        let rows = eta_squared(&table(), &["Flat (u/s)"], "group").unwrap();
        assert_eq!(rows[0].metric, "Flat (u/s)");
        assert!(rows[0].eta_squared.unwrap().abs() < 1e-12);
        assert!(rows[0].f_value.unwrap().abs() < 1e-12);
    }

    #[test]
    fn metrics_are_concatenated_in_order() {
        let rows = eta_squared(&table(), &["Flat (u/s)", "y"], "group").unwrap();
        let tags: Vec<_> = rows
            .iter()
            .map(|row| (row.metric.as_str(), row.source.as_str()))
            .collect();
        assert_eq!(
            tags,
            vec![
                ("Flat (u/s)", "C(group)"),
                ("Flat (u/s)", "Residual"),
                ("y", "C(group)"),
                ("y", "Residual"),
            ]
        );
    }
}
