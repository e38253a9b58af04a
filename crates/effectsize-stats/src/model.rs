//! One-way linear model fitting and ANOVA decomposition.
//!
//! The effect-size families only need "fit `y ~ C(group)`" and "decompose
//! the fit into sums of squares by source". [`ModelFitter`] is that seam;
//! [`OlsFitter`] is the built-in implementation.

use std::fmt;
use std::str::FromStr;

use effectsize_core::{DataTable, is_formula_safe, sanitize_formula_name};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use tracing::debug;

use crate::descriptive::{mean, sum_of_squares};
use crate::errors::{Result, StatsError};

/// Source label of the residual row in an ANOVA table.
pub const RESIDUAL_SOURCE: &str = "Residual";

/// A one-way model formula of the form `response ~ C(factor)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Formula {
    pub response: String,
    pub factor: String,
}

impl Formula {
    /// Build a formula from names that are already formula-safe.
    pub fn one_way(response: &str, factor: &str) -> Result<Self> {
        for name in [response, factor] {
            if !is_formula_safe(name) {
                return Err(StatsError::Formula(format!(
                    "'{name}' cannot be referenced in a formula; sanitize it first"
                )));
            }
        }
        Ok(Self {
            response: response.to_string(),
            factor: factor.to_string(),
        })
    }

    /// Parse `response ~ C(factor)`.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || StatsError::Formula(format!("expected 'response ~ C(factor)', got '{input}'"));

        let (lhs, rhs) = input.split_once('~').ok_or_else(invalid)?;
        let factor = rhs
            .trim()
            .strip_prefix("C(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        Self::one_way(lhs.trim(), factor.trim())
    }

    /// Name of the factor term as it appears in an ANOVA table.
    pub fn factor_term(&self) -> String {
        format!("C({})", self.factor)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ C({})", self.response, self.factor)
    }
}

impl FromStr for Formula {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        Formula::parse(s)
    }
}

/// A named coefficient of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coefficient {
    pub term: String,
    pub estimate: f64,
}

/// Fitted one-way model with treatment coding.
///
/// `levels`, `group_sizes` and `group_means` follow first occurrence in the
/// data. `params` follow sorted level order (numeric when every label parses
/// as a number): the smallest level is the baseline, `Intercept` is its mean
/// and each other level's coefficient is its mean minus the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OneWayFit {
    pub formula: Formula,
    pub levels: Vec<String>,
    pub group_sizes: Vec<usize>,
    pub group_means: Vec<f64>,
    pub grand_mean: f64,
    pub nobs: usize,
    pub params: Vec<Coefficient>,
    /// Sum of squares explained by the factor.
    pub ss_model: f64,
    /// Residual sum of squares.
    pub ss_residual: f64,
}

impl OneWayFit {
    pub fn df_model(&self) -> f64 {
        self.levels.len() as f64 - 1.0
    }

    pub fn df_residual(&self) -> f64 {
        self.nobs as f64 - self.levels.len() as f64
    }

    pub fn r_squared(&self) -> f64 {
        self.ss_model / (self.ss_model + self.ss_residual)
    }
}

/// One row of an ANOVA table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnovaRow {
    pub source: String,
    pub sum_sq: f64,
    pub df: f64,
    /// F statistic; `None` on the residual row.
    pub f_value: Option<f64>,
    /// `PR(>F)`; `None` on the residual row.
    pub p_value: Option<f64>,
}

/// Sum-of-squares decomposition by source.
///
/// Rows are ordered with model terms first and the residual last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnovaTable {
    pub formula: Formula,
    pub rows: Vec<AnovaRow>,
}

impl AnovaTable {
    pub fn source(&self, name: &str) -> Option<&AnovaRow> {
        self.rows.iter().find(|row| row.source == name)
    }

    pub fn factor_row(&self) -> Option<&AnovaRow> {
        self.source(&self.formula.factor_term())
    }

    pub fn residual_row(&self) -> Option<&AnovaRow> {
        self.source(RESIDUAL_SOURCE)
    }

    /// Sum of every row's sum of squares.
    pub fn total_sum_sq(&self) -> f64 {
        self.rows.iter().map(|row| row.sum_sq).sum()
    }
}

/// Model fitting service consumed by the ANOVA-based families.
pub trait ModelFitter {
    /// Fit a one-way model of the formula's response on its factor.
    fn fit(&self, table: &DataTable, formula: &Formula) -> Result<OneWayFit>;

    /// Decompose a fit into a type-II sum-of-squares table.
    fn anova(&self, fit: &OneWayFit) -> Result<AnovaTable>;
}

/// Ordinary least squares for a single categorical factor.
///
/// With one factor the normal equations reduce to group means, so the fit
/// is exact and needs no matrix solve.
#[derive(Debug, Clone, Copy, Default)]
pub struct OlsFitter;

impl ModelFitter for OlsFitter {
    fn fit(&self, table: &DataTable, formula: &Formula) -> Result<OneWayFit> {
        let samples = table.numeric_by_level(&formula.response, &formula.factor)?;
        if samples.len() < 2 {
            return Err(StatsError::SingularModel(format!(
                "factor '{}' has {} level(s); at least 2 are required",
                formula.factor,
                samples.len()
            )));
        }

        let response = table.numeric(&formula.response)?;
        let nobs = response.len();
        let grand_mean = mean(response);

        let mut levels = Vec::with_capacity(samples.len());
        let mut group_sizes = Vec::with_capacity(samples.len());
        let mut group_means = Vec::with_capacity(samples.len());
        let mut ss_model = 0.0;
        let mut ss_residual = 0.0;

        for sample in &samples {
            let group_mean = mean(&sample.values);
            ss_model += sample.values.len() as f64 * (group_mean - grand_mean).powi(2);
            ss_residual += sum_of_squares(&sample.values);
            levels.push(sample.label.clone());
            group_sizes.push(sample.values.len());
            group_means.push(group_mean);
        }

        let order = treatment_order(&levels);
        let baseline = group_means[order[0]];
        let mut params = vec![Coefficient {
            term: "Intercept".to_string(),
            estimate: baseline,
        }];
        for &index in &order[1..] {
            params.push(Coefficient {
                term: format!("{}[T.{}]", formula.factor_term(), levels[index]),
                estimate: group_means[index] - baseline,
            });
        }

        debug!(
            formula = %formula,
            nobs,
            levels = levels.len(),
            ss_model,
            ss_residual,
            "model fitted"
        );

        Ok(OneWayFit {
            formula: formula.clone(),
            levels,
            group_sizes,
            group_means,
            grand_mean,
            nobs,
            params,
            ss_model,
            ss_residual,
        })
    }

    fn anova(&self, fit: &OneWayFit) -> Result<AnovaTable> {
        let df_model = fit.df_model();
        let df_residual = fit.df_residual();
        let f_value = (fit.ss_model / df_model) / (fit.ss_residual / df_residual);
        let p_value = f_survival(f_value, df_model, df_residual);

        Ok(AnovaTable {
            formula: fit.formula.clone(),
            rows: vec![
                AnovaRow {
                    source: fit.formula.factor_term(),
                    sum_sq: fit.ss_model,
                    df: df_model,
                    f_value: Some(f_value),
                    p_value: Some(p_value),
                },
                AnovaRow {
                    source: RESIDUAL_SOURCE.to_string(),
                    sum_sq: fit.ss_residual,
                    df: df_residual,
                    f_value: None,
                    p_value: None,
                },
            ],
        })
    }
}

/// Indices of `levels` in sorted order; numeric when every label parses.
fn treatment_order(levels: &[String]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..levels.len()).collect();
    let numeric: Option<Vec<f64>> = levels.iter().map(|level| level.parse().ok()).collect();
    match numeric {
        Some(values) => order.sort_by(|&a, &b| values[a].total_cmp(&values[b])),
        None => order.sort_by(|&a, &b| levels[a].cmp(&levels[b])),
    }
    order
}

/// Upper-tail probability `P(F > f)` with `(d1, d2)` degrees of freedom.
fn f_survival(f: f64, d1: f64, d2: f64) -> f64 {
    if f.is_nan() || d1.is_nan() || d2.is_nan() || d1 <= 0.0 || d2 <= 0.0 {
        return f64::NAN;
    }
    if f <= 0.0 {
        return 1.0;
    }
    if f.is_infinite() {
        return 0.0;
    }
    FisherSnedecor::new(d1, d2)
        .map(|dist| dist.sf(f))
        .unwrap_or(f64::NAN)
}

/// Fit `metric ~ C(factor)` on a renamed copy of `table` and return its
/// ANOVA table.
///
/// Both names are sanitized for the formula; the caller's table is left
/// untouched and keeps its original names.
pub fn anova_for(
    fitter: &dyn ModelFitter,
    table: &DataTable,
    metric: &str,
    factor: &str,
) -> Result<AnovaTable> {
    let safe_metric = sanitize_formula_name(metric);
    let safe_factor = sanitize_formula_name(factor);
    let renamed = table.with_renamed(&[(metric, safe_metric.as_str()), (factor, safe_factor.as_str())])?;
    let formula = Formula::one_way(&safe_metric, &safe_factor)?;
    let fit = fitter.fit(&renamed, &formula)?;
    fitter.anova(&fit)
}
