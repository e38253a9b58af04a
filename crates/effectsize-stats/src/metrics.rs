use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cohens_d::EffectSizeRow;
use crate::correlation::CorrelationRow;
use crate::eta_squared::AnovaEtaRow;
use crate::partial_eta::PartialEtaRow;

/// Contract version for `report.json` artifacts.
pub const REPORT_VERSION: &str = "0.1";

/// Machine-readable output of a full effect-size run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EffectSizeReport {
    pub report_version: String,
    /// Where the table came from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub observations: usize,
    pub group_column: String,
    /// Group labels in order of first occurrence.
    pub groups: Vec<String>,
    pub metrics: Vec<String>,
    pub factors: Vec<String>,
    pub cohens_d: Vec<EffectSizeRow>,
    pub correlations: Vec<CorrelationRow>,
    pub partial_eta_squared: Vec<PartialEtaRow>,
    pub eta_squared: Vec<AnovaEtaRow>,
    pub performance: PerformanceMetrics,
}

/// Wall-clock timings per family, in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceMetrics {
    pub cohens_d_ms: u64,
    pub correlations_ms: u64,
    pub partial_eta_ms: u64,
    pub eta_squared_ms: u64,
    pub total_ms: u64,
}
