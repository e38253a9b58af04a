use std::path::{Path, PathBuf};
use std::time::Instant;

use effectsize_core::DataTable;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cohens_d::effect_sizes_for_groups;
use crate::correlation::correlations;
use crate::errors::Result;
use crate::eta_squared::eta_squared_with;
use crate::metrics::{EffectSizeReport, PerformanceMetrics, REPORT_VERSION};
use crate::model::{ModelFitter, OlsFitter};
use crate::output::{write_json, write_rows_csv};
use crate::partial_eta::partial_eta_squared_with;
use crate::report::render_report;

/// Options for a full effect-size run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Grouping column for Cohen's d and eta-squared.
    pub group_column: String,
    /// Metric columns; empty means every numeric column that is not a
    /// grouping or factor column, in table order.
    #[serde(default)]
    pub metrics: Vec<String>,
    /// Factor columns for partial eta-squared; empty means the grouping
    /// column alone.
    #[serde(default)]
    pub factors: Vec<String>,
    /// Rows shown per table in `report.md`.
    pub max_rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ReportOptions {
    pub fn new(group_column: impl Into<String>) -> Self {
        Self {
            group_column: group_column.into(),
            metrics: Vec::new(),
            factors: Vec::new(),
            max_rows: 50,
            source: None,
        }
    }
}

/// Paths written by [`ReportEngine::write_artifacts`].
#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    pub out_dir: PathBuf,
    pub report_json: PathBuf,
    pub report_md: PathBuf,
    pub cohens_d_csv: PathBuf,
    pub correlations_csv: PathBuf,
    pub partial_eta_csv: PathBuf,
    pub eta_squared_csv: PathBuf,
}

/// Runs every effect-size family over one table.
pub struct ReportEngine {
    options: ReportOptions,
    fitter: Box<dyn ModelFitter>,
}

impl ReportEngine {
    pub fn new(options: ReportOptions) -> Self {
        Self::with_fitter(options, Box::new(OlsFitter))
    }

    pub fn with_fitter(options: ReportOptions, fitter: Box<dyn ModelFitter>) -> Self {
        Self { options, fitter }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Compute Cohen's d, correlations, partial eta-squared, then eta-squared.
    ///
    /// The first failing family aborts the run.
    pub fn run(&self, table: &DataTable) -> Result<EffectSizeReport> {
        let total_start = Instant::now();
        let group_column = self.options.group_column.as_str();

        let factors = if self.options.factors.is_empty() {
            vec![group_column.to_string()]
        } else {
            self.options.factors.clone()
        };
        let metrics = resolve_metrics(table, &self.options.metrics, group_column, &factors);
        let groups = table.levels(group_column)?;

        let metric_refs: Vec<&str> = metrics.iter().map(String::as_str).collect();
        let factor_refs: Vec<&str> = factors.iter().map(String::as_str).collect();

        info!(
            group_column,
            metrics = metric_refs.len(),
            factors = factor_refs.len(),
            observations = table.row_count(),
            "report started"
        );

        let start = Instant::now();
        let cohens_d = effect_sizes_for_groups(table, group_column, &metric_refs)?;
        let cohens_d_ms = elapsed_ms(start);

        let start = Instant::now();
        let correlations = correlations(table, &metric_refs)?;
        let correlations_ms = elapsed_ms(start);

        let start = Instant::now();
        let partial_eta_squared =
            partial_eta_squared_with(self.fitter.as_ref(), table, &metric_refs, &factor_refs)?;
        let partial_eta_ms = elapsed_ms(start);

        let start = Instant::now();
        let eta_squared = eta_squared_with(self.fitter.as_ref(), table, &metric_refs, group_column)?;
        let eta_squared_ms = elapsed_ms(start);

        let total_ms = elapsed_ms(total_start);
        info!(total_ms, "report finished");

        Ok(EffectSizeReport {
            report_version: REPORT_VERSION.to_string(),
            source: self.options.source.clone(),
            observations: table.row_count(),
            group_column: group_column.to_string(),
            groups,
            metrics,
            factors,
            cohens_d,
            correlations,
            partial_eta_squared,
            eta_squared,
            performance: PerformanceMetrics {
                cohens_d_ms,
                correlations_ms,
                partial_eta_ms,
                eta_squared_ms,
                total_ms,
            },
        })
    }

    /// Write per-family CSV tables, `report.json`, and `report.md`.
    pub fn write_artifacts(
        &self,
        report: &EffectSizeReport,
        out_dir: &Path,
    ) -> Result<ReportArtifacts> {
        std::fs::create_dir_all(out_dir)?;

        let cohens_d_csv = out_dir.join("cohens_d.csv");
        write_rows_csv(&cohens_d_csv, &report.cohens_d)?;

        let correlations_csv = out_dir.join("correlations.csv");
        write_rows_csv(&correlations_csv, &report.correlations)?;

        let partial_eta_csv = out_dir.join("partial_eta_squared.csv");
        write_rows_csv(&partial_eta_csv, &report.partial_eta_squared)?;

        let eta_squared_csv = out_dir.join("eta_squared.csv");
        write_rows_csv(&eta_squared_csv, &report.eta_squared)?;

        let report_json = out_dir.join("report.json");
        write_json(&report_json, report)?;

        let report_md = out_dir.join("report.md");
        std::fs::write(&report_md, render_report(report, self.options.max_rows))?;

        Ok(ReportArtifacts {
            out_dir: out_dir.to_path_buf(),
            report_json,
            report_md,
            cohens_d_csv,
            correlations_csv,
            partial_eta_csv,
            eta_squared_csv,
        })
    }
}

/// Metric columns to analyse.
///
/// Explicit requests are returned unchanged (missing columns fail later, at
/// lookup). Otherwise every numeric column except the grouping and factor
/// columns is used, in table order.
pub fn resolve_metrics(
    table: &DataTable,
    requested: &[String],
    group_column: &str,
    factors: &[String],
) -> Vec<String> {
    if !requested.is_empty() {
        return requested.to_vec();
    }
    table
        .numeric_column_names()
        .into_iter()
        .filter(|name| *name != group_column && !factors.iter().any(|factor| factor == name))
        .map(str::to_string)
        .collect()
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
