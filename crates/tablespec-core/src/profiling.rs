//! Mapping of profiling results and engine schemas into UMF.
//!
//! Profiles are produced by an external profiler; this module only folds the
//! resulting statistics into UMF documents.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::umf::{Nullability, Umf, UmfColumn};

pub const PROFILER_TOOL: &str = "pulseflow-profiler";
pub const PROFILER_VERSION: &str = "1.0.0";

/// Profile statistics for a single column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub column_name: String,
    pub completeness: f64,
    #[serde(default)]
    pub approximate_num_distinct: Option<u64>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub is_data_type_inferred: Option<bool>,
    #[serde(default)]
    pub type_counts: Option<BTreeMap<String, u64>>,
    #[serde(default)]
    pub minimum: Option<Value>,
    #[serde(default)]
    pub maximum: Option<Value>,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub sum: Option<f64>,
    #[serde(default)]
    pub standard_deviation: Option<f64>,
}

/// Complete profile of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrameProfile {
    pub num_records: u64,
    pub columns: BTreeMap<String, ColumnProfile>,
}

/// Table-level profiling run details stored in UMF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProfilingMetadata {
    pub profiled_at: String,
    pub tool: String,
    pub version: String,
    #[serde(default)]
    pub sample_size: Option<u64>,
    pub total_rows: u64,
}

/// Column-level profiling section stored in UMF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnProfiling {
    pub completeness: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_num_distinct: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type_inferred: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<ColumnStatistics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnStatistics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stddev: Option<f64>,
}

impl ColumnStatistics {
    fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.mean.is_none() && self.stddev.is_none()
    }
}

/// Add profiling sections to the UMF columns covered by `profile`.
///
/// Columns with completeness below 1.0 are marked nullable.
pub fn enrich_umf_with_profiling(umf: &mut Umf, profile: &DataFrameProfile, sample_size: Option<u64>) {
    umf.profiling_metadata = Some(ProfilingMetadata {
        profiled_at: chrono::Utc::now().to_rfc3339(),
        tool: PROFILER_TOOL.to_string(),
        version: PROFILER_VERSION.to_string(),
        sample_size,
        total_rows: profile.num_records,
    });

    for column in &mut umf.columns {
        let Some(column_profile) = profile.columns.get(&column.name) else {
            continue;
        };
        column.profiling = Some(build_profiling_section(column_profile));

        if column_profile.completeness < 1.0 {
            column.nullable = Some(Nullability::Flag(true));
            tracing::debug!(
                column = %column.name,
                completeness = column_profile.completeness,
                "marked column nullable from profiling"
            );
        }
    }

    tracing::info!(
        event = "umf_profiling_enriched",
        table = %umf.table_name,
        columns = profile.columns.len()
    );
}

fn build_profiling_section(profile: &ColumnProfile) -> ColumnProfiling {
    let statistics = ColumnStatistics {
        min: profile.minimum.clone(),
        max: profile.maximum.clone(),
        mean: profile.mean.map(round4),
        stddev: profile.standard_deviation.map(round4),
    };

    ColumnProfiling {
        completeness: profile.completeness,
        approximate_num_distinct: profile.approximate_num_distinct,
        data_type_inferred: profile.data_type.clone().filter(|value| !value.is_empty()),
        statistics: (!statistics.is_empty()).then_some(statistics),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Field descriptor reported by a dataframe engine schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineField {
    pub name: String,
    /// Engine type name, e.g. `StringType` or `DecimalType`.
    pub data_type: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
}

fn default_true() -> bool {
    true
}

/// Build a base UMF document from engine schema fields.
pub fn map_fields_to_umf(fields: &[EngineField], table_name: &str, table_type: &str) -> Umf {
    let columns: Vec<UmfColumn> = fields.iter().map(map_field_to_column).collect();
    tracing::info!(event = "engine_schema_mapped", table = %table_name, columns = columns.len());

    Umf {
        version: crate::UMF_VERSION.to_string(),
        table_name: table_name.to_string(),
        source_file: None,
        sheet_name: None,
        description: None,
        table_type: Some(table_type.to_string()),
        columns,
        validation_rules: None,
        relationships: None,
        metadata: None,
        config_data: None,
        lookup_metadata: None,
        profiling_metadata: None,
    }
}

fn map_field_to_column(field: &EngineField) -> UmfColumn {
    let data_type = map_engine_type(&field.data_type);
    let mut column = UmfColumn::new(field.name.clone(), data_type);
    column.nullable = Some(Nullability::Flag(field.nullable));
    column.description = Some(format!("{} (inferred from Spark schema)", field.name));
    if data_type == "DECIMAL" {
        column.precision = field.precision;
        column.scale = field.scale;
    }
    column
}

/// Map an engine type name to a UMF data type; unknown types become STRING.
pub fn map_engine_type(type_name: &str) -> &'static str {
    // Parameterized names such as `DecimalType(10,2)` map by their base name.
    let base = type_name.split('(').next().unwrap_or(type_name).trim();
    match base {
        "StringType" => "STRING",
        "IntegerType" => "INTEGER",
        "LongType" => "LONG",
        "DoubleType" => "DOUBLE",
        "FloatType" => "FLOAT",
        "BooleanType" => "BOOLEAN",
        "DateType" => "DATE",
        "TimestampType" => "TIMESTAMP",
        "DecimalType" => "DECIMAL",
        other => {
            tracing::debug!(engine_type = %other, "unmapped engine type, defaulting to STRING");
            "STRING"
        }
    }
}
