//! Intake checks for expectation suites produced by other tools.
//!
//! Upstream suites are checked for the current suite layout before they are
//! stored, and can be merged with the baseline derived from the UMF document.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};
use tablespec_core::{ValidationIssue, ValidationReport};

use crate::errors::Result;
use crate::suite::Expectation;

/// Severities accepted in `meta.severity`.
pub const VALID_SEVERITIES: [&str; 3] = ["critical", "warning", "info"];

/// Check that `suite` uses the current layout: a `name`, an `expectations`
/// array, and entries carrying `type` and `kwargs`.
///
/// Legacy field names are reported with the rename they need. Every entry is
/// checked, not just the first.
pub fn validate_suite_format(suite: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    let Some(document) = suite.as_object() else {
        report.push(ValidationIssue::error(
            "suite_not_object",
            "/",
            "Suite must be a mapping",
        ));
        return report;
    };

    if !document.contains_key("name") {
        if document.contains_key("expectation_suite_name") {
            report.push(ValidationIssue::error(
                "legacy_suite_name",
                "/expectation_suite_name",
                "Legacy format: rename 'expectation_suite_name' to 'name'",
            ));
        } else {
            report.push(ValidationIssue::error(
                "missing_name",
                "/name",
                "Missing required field 'name' (suite name)",
            ));
        }
    }

    if document.contains_key("data_asset_type") {
        report.push(ValidationIssue::error(
            "legacy_data_asset_type",
            "/data_asset_type",
            "Legacy field 'data_asset_type' not supported (remove it)",
        ));
    }

    let expectations = match document.get("expectations") {
        None => {
            report.push(ValidationIssue::error(
                "missing_expectations",
                "/expectations",
                "Missing required field 'expectations'",
            ));
            return report;
        }
        Some(Value::Array(expectations)) => expectations,
        Some(_) => {
            report.push(ValidationIssue::error(
                "expectations_not_array",
                "/expectations",
                "Field 'expectations' must be an array",
            ));
            return report;
        }
    };

    for (idx, entry) in expectations.iter().enumerate() {
        check_expectation(&mut report, &format!("/expectations/{idx}"), entry);
    }

    report
}

fn check_expectation(report: &mut ValidationReport, path: &str, entry: &Value) {
    let Some(entry) = entry.as_object() else {
        report.push(ValidationIssue::error(
            "expectation_not_object",
            path,
            "Expectations must be objects",
        ));
        return;
    };

    if !entry.contains_key("type") {
        if entry.contains_key("expectation_type") {
            report.push(ValidationIssue::error(
                "legacy_expectation_type",
                format!("{path}/expectation_type"),
                "Legacy format: rename 'expectation_type' to 'type' in expectations",
            ));
        } else {
            report.push(ValidationIssue::error(
                "missing_type",
                format!("{path}/type"),
                "Expectation missing required field 'type'",
            ));
        }
    }

    if !entry.contains_key("kwargs") {
        report.push(ValidationIssue::error(
            "missing_kwargs",
            format!("{path}/kwargs"),
            "Expectation missing required field 'kwargs'",
        ));
    }

    let severity = entry
        .get("meta")
        .and_then(Value::as_object)
        .and_then(|meta| meta.get("severity"));
    if let Some(severity) = severity {
        let valid = severity
            .as_str()
            .is_some_and(|severity| VALID_SEVERITIES.contains(&severity));
        if !valid {
            let shown = severity.as_str().map_or_else(|| severity.to_string(), str::to_string);
            report.push(ValidationIssue::error(
                "invalid_severity",
                format!("{path}/meta/severity"),
                format!("Invalid severity '{shown}' (use: critical, warning, or info)"),
            ));
        }
    }
}

/// Identity used to drop baseline rules the upstream suite already has.
///
/// Single-column rules are keyed by type and column; anything else by type
/// and the key-sorted JSON of its kwargs.
pub fn expectation_signature(entry: &Value) -> String {
    let expectation_type = entry.get("type").and_then(Value::as_str).unwrap_or_default();
    let kwargs = entry.get("kwargs").and_then(Value::as_object);
    let column = kwargs
        .and_then(|kwargs| kwargs.get("column"))
        .and_then(Value::as_str)
        .filter(|column| !column.is_empty());
    if let Some(column) = column {
        return format!("{expectation_type}:{column}");
    }

    let sorted: BTreeMap<&String, &Value> = kwargs.map(|kwargs| kwargs.iter().collect()).unwrap_or_default();
    let encoded = serde_json::to_string(&sorted).unwrap_or_default();
    format!("{expectation_type}:{encoded}")
}

/// Prepend the baseline rules missing from `upstream`.
///
/// Upstream entries are kept verbatim and in order after the baseline. A
/// non-mapping `upstream` becomes an empty suite, and a missing or non-array
/// `expectations` is treated as empty.
pub fn merge_baseline_expectations(upstream: Value, baseline: &[Expectation]) -> Result<Value> {
    let mut document = match upstream {
        Value::Object(document) => document,
        _ => Map::new(),
    };
    let upstream_expectations = match document.remove("expectations") {
        Some(Value::Array(entries)) => entries,
        _ => Vec::new(),
    };

    let seen: HashSet<String> = upstream_expectations.iter().map(expectation_signature).collect();
    let mut merged = Vec::with_capacity(baseline.len() + upstream_expectations.len());
    for expectation in baseline {
        let entry = serde_json::to_value(expectation)?;
        if !seen.contains(&expectation_signature(&entry)) {
            merged.push(entry);
        }
    }
    let added = merged.len();
    merged.extend(upstream_expectations);

    tracing::info!(
        event = "baseline_merged",
        baseline = added,
        skipped = baseline.len() - added,
        total = merged.len()
    );
    document.insert("expectations".to_string(), Value::Array(merged));
    Ok(Value::Object(document))
}
