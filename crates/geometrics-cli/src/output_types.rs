use geometrics_core::models::{ExcludedShape, MetricReport};
use serde::Serialize;
use std::collections::BTreeMap;

/// Output for evaluate command
#[derive(Debug, Serialize)]
pub struct EvaluateOutput {
    #[serde(flatten)]
    pub report: MetricReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
}

/// Output for validate command
#[derive(Debug, Serialize)]
pub struct ValidateOutput {
    pub units: Vec<UnitValidation>,
    pub shapes_total: usize,
    pub shapes_excluded: usize,
}

#[derive(Debug, Serialize)]
pub struct UnitValidation {
    pub unit: String,
    pub references: usize,
    pub candidates: usize,
    pub excluded: Vec<ExcludedShape>,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub config_file: Option<String>,
    pub values: BTreeMap<String, ConfigValue<String>>,
    /// Set when the effective values do not form a valid configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: String,
}
