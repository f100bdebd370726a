use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use jsonschema::JSONSchema;
use regex::Regex;
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::umf::Umf;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+$").expect("valid version regex"));
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("valid identifier regex"));

const MAX_IDENTIFIER_LEN: usize = 128;
const DATA_TYPES: &[&str] = &[
    "VARCHAR", "DECIMAL", "INTEGER", "DATE", "DATETIME", "BOOLEAN", "TEXT", "CHAR", "FLOAT",
];
const SEVERITIES: &[&str] = &["error", "warning", "info"];

/// Default file suffix for UMF documents in a directory.
pub const UMF_FILE_SUFFIX: &str = ".umf.yaml";

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// Structured validation issue with location and hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: String,
    pub path: String,
    pub message: String,
    pub hint: Option<String>,
}

impl ValidationIssue {
    pub fn error(code: impl Into<String>, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            code: code.into(),
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn warning(
        code: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
        hint: Option<String>,
    ) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            code: code.into(),
            path: path.into(),
            message: message.into(),
            hint,
        }
    }
}

/// Aggregated validation report with errors and warnings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            IssueSeverity::Error => self.errors.push(issue),
            IssueSeverity::Warning => self.warnings.push(issue),
        }
    }

    /// Merge another report into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Error messages, one line per issue.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|issue| format!("{} at {}", issue.message, issue.path))
            .collect()
    }
}

/// Fallback specifications applied to under-specified columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecDefaults {
    pub varchar_length: u32,
    pub decimal_precision: u32,
    pub decimal_scale: u32,
}

impl Default for SpecDefaults {
    fn default() -> Self {
        Self {
            varchar_length: 255,
            decimal_precision: 18,
            decimal_scale: 2,
        }
    }
}

/// Emit the JSON Schema for UMF documents.
pub fn umf_json_schema() -> RootSchema {
    schema_for!(Umf)
}

/// Validate a raw UMF document against the UMF JSON Schema.
pub fn validate_umf_json(document: &Value) -> Result<ValidationReport> {
    let schema = serde_json::to_value(umf_json_schema())?;
    let compiled = JSONSchema::compile(&schema).map_err(|err| Error::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();
    if let Err(errors) = compiled.validate(document) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push(ValidationIssue::error("schema_violation", path, error.to_string()));
        }
    }
    Ok(report)
}

/// Validate business rules that the JSON Schema does not express.
pub fn validate_umf(umf: &Umf) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !VERSION_RE.is_match(&umf.version) {
        report.push(ValidationIssue::error(
            "invalid_version",
            "/version",
            format!("Invalid version format: {}", umf.version),
        ));
    }
    check_identifier(&mut report, "/table_name", "table name", &umf.table_name);

    if umf.columns.is_empty() {
        report.push(ValidationIssue::error(
            "no_columns",
            "/columns",
            "UMF must define at least one column",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, column) in umf.columns.iter().enumerate() {
        let path = format!("/columns/{idx}");
        if !seen.insert(column.name.as_str()) {
            report.push(ValidationIssue::error(
                "duplicate_column",
                format!("{path}/name"),
                format!("Column names must be unique: {}", column.name),
            ));
        }
        check_identifier(&mut report, &format!("{path}/name"), "column name", &column.name);

        if !DATA_TYPES.contains(&column.data_type.as_str()) {
            report.push(ValidationIssue::error(
                "invalid_data_type",
                format!("{path}/data_type"),
                format!("unsupported data type '{}'", column.data_type),
            ));
        }
        if column.length == Some(0) {
            report.push(ValidationIssue::error(
                "invalid_length",
                format!("{path}/length"),
                "length must be >= 1",
            ));
        }
        if column.precision == Some(0) {
            report.push(ValidationIssue::error(
                "invalid_precision",
                format!("{path}/precision"),
                "precision must be >= 1",
            ));
        }

        if column.data_type == "VARCHAR" && column.length.is_none() {
            tracing::warn!(column = %column.name, "VARCHAR column missing length specification");
            report.push(ValidationIssue::warning(
                "varchar_without_length",
                format!("{path}/length"),
                format!("VARCHAR column '{}' missing length specification", column.name),
                Some("apply default specifications to fill in a length".to_string()),
            ));
        }
        if column.data_type == "DECIMAL" && column.precision.is_none() {
            tracing::warn!(column = %column.name, "DECIMAL column missing precision specification");
            report.push(ValidationIssue::warning(
                "decimal_without_precision",
                format!("{path}/precision"),
                format!("DECIMAL column '{}' missing precision specification", column.name),
                Some("apply default specifications to fill in precision and scale".to_string()),
            ));
        }
    }

    if let Some(rules) = &umf.validation_rules {
        let table_rules = rules
            .table_level
            .iter()
            .flatten()
            .enumerate()
            .map(|(idx, rule)| (format!("/validation_rules/table_level/{idx}"), rule));
        let column_rules = rules.column_level.iter().flatten().flat_map(|(column, rules)| {
            rules.iter().enumerate().map(move |(idx, rule)| {
                (format!("/validation_rules/column_level/{column}/{idx}"), rule)
            })
        });
        for (path, rule) in table_rules.chain(column_rules) {
            if !SEVERITIES.contains(&rule.severity.as_str()) {
                report.push(ValidationIssue::error(
                    "invalid_severity",
                    format!("{path}/severity"),
                    format!("severity must be one of error, warning, info: {}", rule.severity),
                ));
            }
        }
    }

    if let Some(phase) = umf.metadata.as_ref().and_then(|metadata| metadata.pipeline_phase)
        && !(1..=7).contains(&phase)
    {
        report.push(ValidationIssue::error(
            "invalid_pipeline_phase",
            "/metadata/pipeline_phase",
            format!("pipeline_phase must be between 1 and 7: {phase}"),
        ));
    }

    if let Some(relationships) = &umf.relationships {
        for (idx, fk) in relationships.foreign_keys.iter().flatten().enumerate() {
            let path = format!("/relationships/foreign_keys/{idx}");
            check_confidence(&mut report, &path, fk.confidence);
            if fk.target_table().is_none() || fk.target_column().is_none() {
                report.push(ValidationIssue::error(
                    "incomplete_foreign_key",
                    path,
                    format!("foreign key on '{}' has no referenced table/column", fk.column),
                ));
            }
        }
        for (idx, reference) in relationships.referenced_by.iter().flatten().enumerate() {
            check_confidence(
                &mut report,
                &format!("/relationships/referenced_by/{idx}"),
                reference.confidence,
            );
        }
    }

    report
}

/// Validate a UMF YAML file: structural checks first, then business rules.
pub fn validate_umf_file(path: &Path) -> Result<ValidationReport> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "UMF file not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;

    let document: Value = match serde_yaml::from_str(&content) {
        Ok(document) => document,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error(
                "invalid_yaml",
                "/",
                format!("Invalid YAML in {}: {err}", path.display()),
            ));
            return Ok(report);
        }
    };

    let mut report = validate_umf_json(&document)?;
    if !report.is_ok() {
        return Ok(report);
    }

    match serde_json::from_value::<Umf>(document) {
        Ok(umf) => report.merge(validate_umf(&umf)),
        Err(err) => report.push(ValidationIssue::error("invalid_umf", "/", err.to_string())),
    }

    if report.is_ok() {
        tracing::debug!(event = "umf_valid", path = %path.display());
    } else {
        tracing::warn!(
            event = "umf_invalid",
            path = %path.display(),
            errors = report.errors.len()
        );
    }
    Ok(report)
}

/// Validate every file in `dir` whose name ends with `suffix`.
///
/// Returns a pass/fail flag per file; unreadable files count as failures.
pub fn validate_umf_directory(dir: &Path, suffix: &str) -> Result<BTreeMap<PathBuf, bool>> {
    if !dir.is_dir() {
        return Err(Error::NotFound(format!(
            "Directory not found: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(suffix));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        tracing::warn!(dir = %dir.display(), suffix, "no UMF files found");
        return Ok(BTreeMap::new());
    }

    let mut results = BTreeMap::new();
    for path in files {
        let valid = match validate_umf_file(&path) {
            Ok(report) => report.is_ok(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to validate UMF file");
                false
            }
        };
        results.insert(path, valid);
    }

    let valid_count = results.values().filter(|valid| **valid).count();
    tracing::info!(
        event = "umf_directory_validated",
        dir = %dir.display(),
        valid = valid_count,
        total = results.len()
    );
    Ok(results)
}

/// Fill in VARCHAR length and DECIMAL precision/scale where missing.
pub fn apply_default_specifications(umf: &mut Umf, defaults: &SpecDefaults) {
    for column in &mut umf.columns {
        match column.data_type.as_str() {
            "VARCHAR" if column.length.is_none() => {
                column.length = Some(defaults.varchar_length);
                tracing::debug!(column = %column.name, length = defaults.varchar_length, "applied default length");
            }
            "DECIMAL" => {
                if column.precision.is_none() {
                    column.precision = Some(defaults.decimal_precision);
                    tracing::debug!(column = %column.name, precision = defaults.decimal_precision, "applied default precision");
                }
                if column.scale.is_none() {
                    column.scale = Some(defaults.decimal_scale);
                    tracing::debug!(column = %column.name, scale = defaults.decimal_scale, "applied default scale");
                }
            }
            _ => {}
        }
    }
}

/// Rename repeated column names to `name_2`, `name_3`, ...
///
/// The first occurrence keeps its name; renamed columns remember the
/// original in `original_name`.
pub fn fix_duplicate_column_names(umf: &mut Umf) {
    let mut seen: HashMap<String, u32> = HashMap::new();
    for column in &mut umf.columns {
        let original = column.name.clone();
        let count = seen.entry(original.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            column.name = format!("{original}_{count}");
            if column.original_name.is_none() {
                column.original_name = Some(original.clone());
            }
            tracing::debug!(from = %original, to = %column.name, "renamed duplicate column");
        }
    }
}

fn check_identifier(report: &mut ValidationReport, path: &str, label: &str, value: &str) {
    if !IDENTIFIER_RE.is_match(value) || value.len() > MAX_IDENTIFIER_LEN {
        report.push(ValidationIssue::error(
            "invalid_identifier",
            path,
            format!("invalid {label} '{value}'"),
        ));
    }
}

fn check_confidence(report: &mut ValidationReport, path: &str, confidence: Option<f64>) {
    if let Some(confidence) = confidence
        && !(0.0..=1.0).contains(&confidence)
    {
        report.push(ValidationIssue::error(
            "invalid_confidence",
            format!("{path}/confidence"),
            format!("confidence must be between 0 and 1: {confidence}"),
        ));
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
