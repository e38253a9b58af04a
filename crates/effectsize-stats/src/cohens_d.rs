//! Cohen's d between every pair of groups.

use effectsize_core::DataTable;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::descriptive::{mean, sample_variance};
use crate::errors::Result;
use crate::float_format;

/// Qualitative band for `|d|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum EffectMagnitude {
    #[serde(rename = "Small effect size")]
    Small,
    #[serde(rename = "Medium effect size")]
    Medium,
    #[serde(rename = "Large effect size")]
    Large,
    #[serde(rename = "Very large effect size")]
    VeryLarge,
}

impl EffectMagnitude {
    /// Band for a Cohen's d value. Boundaries belong to the higher band.
    ///
    /// NaN compares false against every threshold and lands in
    /// [`EffectMagnitude::VeryLarge`].
    pub fn interpret(d: f64) -> Self {
        let magnitude = d.abs();
        if magnitude < 0.2 {
            EffectMagnitude::Small
        } else if magnitude < 0.5 {
            EffectMagnitude::Medium
        } else if magnitude < 0.8 {
            EffectMagnitude::Large
        } else {
            EffectMagnitude::VeryLarge
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EffectMagnitude::Small => "Small effect size",
            EffectMagnitude::Medium => "Medium effect size",
            EffectMagnitude::Large => "Large effect size",
            EffectMagnitude::VeryLarge => "Very large effect size",
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            EffectMagnitude::Small => {
                "There is a small difference between the groups, and the effect is minimal."
            }
            EffectMagnitude::Medium => {
                "The difference between the groups is moderate, with noticeable effects."
            }
            EffectMagnitude::Large => {
                "There is a large difference between the groups, with a strong effect."
            }
            EffectMagnitude::VeryLarge => {
                "The difference between the groups is very large, indicating a very strong effect."
            }
        }
    }
}

/// One Cohen's d comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EffectSizeRow {
    #[serde(rename = "Column")]
    pub column: String,
    #[serde(rename = "Pair")]
    pub pair: String,
    #[serde(rename = "Cohen's d", with = "float_format")]
    #[schemars(with = "float_format::ReportFloat")]
    pub cohens_d: f64,
    #[serde(rename = "Interpretation")]
    pub interpretation: EffectMagnitude,
    #[serde(rename = "Explanation")]
    pub explanation: String,
}

/// Standardized mean difference `(mean_a - mean_b) / pooled_std`.
///
/// `pooled_std = sqrt((var_a + var_b) / 2)` with sample variances. Two
/// constant samples give a non-finite result, which is returned as-is.
pub fn compute_d(group_a: &[f64], group_b: &[f64]) -> f64 {
    let pooled_std = ((sample_variance(group_a) + sample_variance(group_b)) / 2.0).sqrt();
    (mean(group_a) - mean(group_b)) / pooled_std
}

/// Label and explanation for a Cohen's d value.
pub fn interpret(d: f64) -> (&'static str, &'static str) {
    let magnitude = EffectMagnitude::interpret(d);
    (magnitude.label(), magnitude.explanation())
}

/// Cohen's d for every metric and every unordered pair of groups.
///
/// Groups are taken from `group_column` in order of first occurrence and
/// each pair `(i, j)` with `i < j` is reported once, per metric, in
/// metric order.
pub fn effect_sizes_for_groups(
    table: &DataTable,
    group_column: &str,
    metric_columns: &[&str],
) -> Result<Vec<EffectSizeRow>> {
    let mut rows = Vec::new();

    for metric in metric_columns {
        let groups = table.numeric_by_level(metric, group_column)?;
        for (i, first) in groups.iter().enumerate() {
            for second in &groups[i + 1..] {
                let d = compute_d(&first.values, &second.values);
                let magnitude = EffectMagnitude::interpret(d);
                rows.push(EffectSizeRow {
                    column: metric.to_string(),
                    pair: format!("{} vs {}", first.label, second.label),
                    cohens_d: d,
                    interpretation: magnitude,
                    explanation: magnitude.explanation().to_string(),
                });
            }
        }
    }

    info!(
        group_column,
        metrics = metric_columns.len(),
        rows = rows.len(),
        "cohen's d computed"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use effectsize_core::Column;

    use super::*;

    #[test]
    fn band_boundaries_belong_to_the_higher_band() {
        assert_eq!(EffectMagnitude::interpret(0.19), EffectMagnitude::Small);
        assert_eq!(EffectMagnitude::interpret(0.2), EffectMagnitude::Medium);
        assert_eq!(EffectMagnitude::interpret(0.49), EffectMagnitude::Medium);
        assert_eq!(EffectMagnitude::interpret(0.5), EffectMagnitude::Large);
        assert_eq!(EffectMagnitude::interpret(0.79), EffectMagnitude::Large);
        assert_eq!(EffectMagnitude::interpret(0.8), EffectMagnitude::VeryLarge);
        assert_eq!(EffectMagnitude::interpret(-0.5), EffectMagnitude::Large);
    }

    #[test]
    fn interpret_returns_label_and_explanation() {
        let (label, explanation) = interpret(0.1);
        assert_eq!(label, "Small effect size");
        assert!(explanation.contains("minimal"));
    }

    #[test]
    fn compute_d_known_value() {
        // means 2 and 4, variances 1 and 1 -> d = -2
        let d = compute_d(&[1.0, 2.0, 3.0], &[3.0, 4.0, 5.0]);
        assert!((d + 2.0).abs() < 1e-12);
    }

    #[test]
    fn compute_d_is_antisymmetric() {
        let a = [4.1, 5.3, 2.2, 6.8, 5.0];
        let b = [3.3, 1.9, 4.4, 2.5];
        assert_eq!(compute_d(&a, &b), -compute_d(&b, &a));
    }

    #[test]
    fn constant_samples_propagate_non_finite() {
        assert!(compute_d(&[1.0, 1.0], &[2.0, 2.0]).is_infinite());
        assert!(compute_d(&[1.0, 1.0], &[1.0, 1.0]).is_nan());
        assert_eq!(
            EffectMagnitude::interpret(f64::NAN),
            EffectMagnitude::VeryLarge
        );
    }

    #[test]
    fn pairs_follow_first_occurrence() {
        let table = DataTable::new(vec![
            Column::categorical("g", vec!["b", "a", "b", "c", "a", "c"]),
            Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            Column::numeric("y", vec![6.0, 5.0, 4.0, 3.0, 2.0, 1.0]),
        ])
        .unwrap();
        let rows = effect_sizes_for_groups(&table, "g", &["x", "y"]).unwrap();
        let pairs: Vec<_> = rows.iter().map(|r| (r.column.as_str(), r.pair.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("x", "b vs a"),
                ("x", "b vs c"),
                ("x", "a vs c"),
                ("y", "b vs a"),
                ("y", "b vs c"),
                ("y", "a vs c"),
            ]
        );
    }

    #[test]
    fn row_serializes_with_report_labels() {
        let row = EffectSizeRow {
            column: "length".to_string(),
            pair: "A vs B".to_string(),
            cohens_d: 0.3,
            interpretation: EffectMagnitude::Medium,
            explanation: EffectMagnitude::Medium.explanation().to_string(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["Cohen's d"], 0.3);
        assert_eq!(json["Interpretation"], "Medium effect size");
    }
}
