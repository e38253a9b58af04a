//! Effect-size statistics over grouped tabular data.
//!
//! Four independent families share one shape: iterate over combinations,
//! compute one statistic each, attach an interpretation, and collect rows.
//! The ANOVA-based families go through the [`ModelFitter`] seam.

pub mod cohens_d;
pub mod correlation;
pub mod descriptive;
pub mod engine;
pub mod errors;
pub mod eta_squared;
pub mod float_format;
pub mod metrics;
pub mod model;
pub mod output;
pub mod partial_eta;
pub mod report;

pub use cohens_d::{EffectMagnitude, EffectSizeRow, compute_d, effect_sizes_for_groups, interpret};
pub use correlation::{
    CorrelationDirection, CorrelationRow, CorrelationStrength, Pearson, correlations, pearson,
};
pub use engine::{ReportArtifacts, ReportEngine, ReportOptions, resolve_metrics};
pub use errors::{Result, StatsError};
pub use eta_squared::{AnovaEtaRow, eta_squared, eta_squared_from_anova, eta_squared_with};
pub use metrics::{EffectSizeReport, PerformanceMetrics, REPORT_VERSION};
pub use model::{AnovaRow, AnovaTable, Formula, ModelFitter, OlsFitter, OneWayFit, anova_for};
pub use output::{write_json, write_rows_csv};
pub use partial_eta::{
    EtaMagnitude, PartialEtaRow, partial_eta_from_anova, partial_eta_squared,
    partial_eta_squared_with,
};
pub use report::{
    render_cohens_d, render_correlations, render_eta_squared, render_partial_eta, render_report,
};
