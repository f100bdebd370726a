//! Deterministic expectations derived from UMF metadata.
//!
//! Baseline rules need nothing beyond the UMF document itself: structural
//! checks, column existence and type, required columns, maximum lengths and
//! the storage format of DATE columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tablespec_core::{Umf, UmfColumn, map_to_gx_spark_type};

use crate::errors::GxError;
use crate::suite::{
    EXPECT_COLUMN_TO_EXIST, EXPECT_COLUMN_VALUE_LENGTHS_TO_BE_BETWEEN,
    EXPECT_COLUMN_VALUES_TO_BE_OF_TYPE, EXPECT_COLUMN_VALUES_TO_BE_UNIQUE,
    EXPECT_COLUMN_VALUES_TO_MATCH_STRFTIME_FORMAT, EXPECT_COLUMN_VALUES_TO_NOT_BE_NULL,
    EXPECT_TABLE_COLUMN_COUNT_TO_EQUAL, EXPECT_TABLE_COLUMNS_TO_MATCH_ORDERED_LIST, Expectation,
    ExpectationSuite,
};

pub const GENERATED_BY: &str = "tablespec";
pub const GENERATED_FROM_BASELINE: &str = "baseline";
pub const GENERATED_FROM_PROFILING: &str = "profiling";

/// Storage format of UMF DATE columns.
pub const DATE_STORAGE_FORMAT: &str = "%Y%m%d";

/// How aggressively profiling statistics turn into expectations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    Loose,
    #[default]
    Medium,
    Strict,
}

impl Strictness {
    pub fn as_str(self) -> &'static str {
        match self {
            Strictness::Loose => "loose",
            Strictness::Medium => "medium",
            Strictness::Strict => "strict",
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strictness {
    type Err = GxError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "loose" => Ok(Strictness::Loose),
            "medium" => Ok(Strictness::Medium),
            "strict" => Ok(Strictness::Strict),
            other => Err(GxError::InvalidStrictness(other.to_string())),
        }
    }
}

fn rule(expectation_type: &str, description: String, severity: &str) -> Expectation {
    Expectation::new(expectation_type)
        .meta("description", description)
        .meta("severity", severity)
        .meta("generated_from", GENERATED_FROM_BASELINE)
}

/// Baseline expectations for a whole table.
///
/// Structural rules (column count and ordered column list) come first when
/// requested, followed by the per-column rules in column order.
pub fn generate_baseline_expectations(umf: &Umf, include_structural: bool) -> Vec<Expectation> {
    let mut expectations = Vec::new();
    if include_structural && !umf.columns.is_empty() {
        let count = umf.columns.len();
        expectations.push(
            rule(
                EXPECT_TABLE_COLUMN_COUNT_TO_EQUAL,
                format!("Table must have exactly {count} columns"),
                "critical",
            )
            .kwarg("value", count),
        );
        expectations.push(
            rule(
                EXPECT_TABLE_COLUMNS_TO_MATCH_ORDERED_LIST,
                "Table columns must match expected schema in order".to_string(),
                "critical",
            )
            .kwarg("column_list", umf.column_names()),
        );
    }
    for column in &umf.columns {
        expectations.extend(generate_baseline_column_expectations(column));
    }
    expectations
}

/// Baseline expectations for a single column.
pub fn generate_baseline_column_expectations(column: &UmfColumn) -> Vec<Expectation> {
    let name = column.name.as_str();
    let gx_type = map_to_gx_spark_type(&column.data_type);
    let mut expectations = vec![
        rule(
            EXPECT_COLUMN_TO_EXIST,
            format!("Column {name} must exist in table schema"),
            "critical",
        )
        .kwarg("column", name),
        rule(
            EXPECT_COLUMN_VALUES_TO_BE_OF_TYPE,
            format!(
                "Column {name} must be {gx_type} (from UMF: {})",
                column.data_type
            ),
            "info",
        )
        .kwarg("column", name)
        .kwarg("type_", gx_type),
    ];

    let required_lobs = column.required_lobs();
    if !required_lobs.is_empty() {
        expectations.push(
            rule(
                EXPECT_COLUMN_VALUES_TO_NOT_BE_NULL,
                format!(
                    "Column {name} is required (nullable=false) for LOBs: {}",
                    required_lobs.join(", ")
                ),
                "critical",
            )
            .kwarg("column", name)
            .meta("lob", required_lobs),
        );
    } else if column.is_required() {
        expectations.push(
            rule(
                EXPECT_COLUMN_VALUES_TO_NOT_BE_NULL,
                format!("Column {name} is required (nullable=false)"),
                "critical",
            )
            .kwarg("column", name),
        );
    }

    if let Some(length) = column.length.filter(|length| *length > 0) {
        expectations.push(
            rule(
                EXPECT_COLUMN_VALUE_LENGTHS_TO_BE_BETWEEN,
                format!(
                    "Column {name} values must not exceed {length} characters (from UMF max_length/length)"
                ),
                "warning",
            )
            .kwarg("column", name)
            .kwarg("max_value", length),
        );
    }

    if column.data_type.eq_ignore_ascii_case("DATE") {
        expectations.push(
            rule(
                EXPECT_COLUMN_VALUES_TO_MATCH_STRFTIME_FORMAT,
                format!("Column {name} must match YYYYMMDD date format (standard for DATE type)"),
                "warning",
            )
            .kwarg("column", name)
            .kwarg("strftime_format", DATE_STORAGE_FORMAT),
        );
    }

    expectations
}

/// Expectations backed by column profiling statistics.
///
/// Only `strict` produces rules today: a fully populated column whose
/// distinct count equals the row count is expected to stay unique.
pub fn generate_profiling_expectations(
    umf: &Umf,
    column: &UmfColumn,
    strictness: Strictness,
) -> Vec<Expectation> {
    let Some(profiling) = column.profiling.as_ref() else {
        return Vec::new();
    };
    if strictness != Strictness::Strict {
        return Vec::new();
    }
    let Some(total_rows) = umf.profiling_metadata.as_ref().map(|meta| meta.total_rows) else {
        return Vec::new();
    };

    let mut expectations = Vec::new();
    if total_rows > 0
        && profiling.completeness >= 1.0
        && profiling.approximate_num_distinct == Some(total_rows)
    {
        let name = column.name.as_str();
        expectations.push(
            Expectation::new(EXPECT_COLUMN_VALUES_TO_BE_UNIQUE)
                .kwarg("column", name)
                .meta(
                    "description",
                    format!("Column {name} was unique across {total_rows} profiled rows"),
                )
                .meta("severity", "warning")
                .meta("generated_from", GENERATED_FROM_PROFILING),
        );
    }
    expectations
}

/// Full suite for a table: baseline rules followed by profiling rules.
pub fn build_expectation_suite(umf: &Umf, source: &str, strictness: Strictness) -> ExpectationSuite {
    let table = umf.table_name.as_str();
    let mut suite = ExpectationSuite::new(format!("{table}_suite"));
    suite.meta.insert("table_name".to_string(), json!(table));
    suite
        .meta
        .insert("generated_by".to_string(), json!(GENERATED_BY));
    suite
        .meta
        .insert("strictness".to_string(), json!(strictness.as_str()));
    suite
        .meta
        .insert("source_umf".to_string(), Value::String(source.to_string()));

    suite.expectations = generate_baseline_expectations(umf, true);
    for column in &umf.columns {
        suite
            .expectations
            .extend(generate_profiling_expectations(umf, column, strictness));
    }

    tracing::info!(
        event = "expectation_suite_built",
        table = %table,
        strictness = %strictness,
        expectations = suite.expectations.len()
    );
    suite
}
