//! Expectation suite files under `<dir>/tables/<table>.expectations.yaml`.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::errors::Result;
use crate::suite::ExpectationSuite;

pub const SUITE_FILE_SUFFIX: &str = ".expectations.yaml";

/// Location of the suite file for `table` inside `dir`.
pub fn suite_path(table: &str, dir: &Path) -> PathBuf {
    dir.join("tables").join(format!("{table}{SUITE_FILE_SUFFIX}"))
}

/// Load the raw suite document for `table`.
///
/// A missing file and an unreadable or unparseable file both yield `None`;
/// the first is logged at debug level and the second as a warning.
pub fn load_expectations_for_table(table: &str, dir: &Path) -> Option<Value> {
    let path = suite_path(table, dir);
    if !path.exists() {
        tracing::debug!(event = "suite_missing", table = %table, path = %path.display());
        return None;
    }
    match read_suite_document(&path) {
        Ok(document) => {
            tracing::debug!(event = "suite_loaded", table = %table, path = %path.display());
            Some(document)
        }
        Err(err) => {
            tracing::warn!(
                event = "suite_load_failed",
                table = %table,
                path = %path.display(),
                error = %err
            );
            None
        }
    }
}

fn read_suite_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Write `suite` where [`load_expectations_for_table`] will find it.
pub fn save_expectation_suite(suite: &ExpectationSuite, table: &str, dir: &Path) -> Result<PathBuf> {
    write_suite_file(&suite.to_yaml()?, table, dir, suite.expectations.len())
}

/// Write an untyped suite document, such as a merged upstream suite.
pub fn save_suite_document(document: &Value, table: &str, dir: &Path) -> Result<PathBuf> {
    let expectations = document
        .get("expectations")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    write_suite_file(&serde_yaml::to_string(document)?, table, dir, expectations)
}

/// Read a suite document from any YAML or JSON file.
pub fn read_suite_file(path: &Path) -> Result<Value> {
    read_suite_document(path)
}

fn write_suite_file(encoded: &str, table: &str, dir: &Path, expectations: usize) -> Result<PathBuf> {
    let path = suite_path(table, dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, encoded)?;
    tracing::info!(
        event = "suite_written",
        table = %table,
        path = %path.display(),
        expectations
    );
    Ok(path)
}
