use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::profiling::{ColumnProfiling, ProfilingMetadata};

/// Universal Metadata Format document describing one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Umf {
    /// UMF format version (`major.minor`).
    #[schemars(regex(pattern = r"^\d+\.\d+$"))]
    pub version: String,
    /// Database table name.
    #[schemars(regex(pattern = r"^[A-Za-z][A-Za-z0-9_]*$"), length(max = 128))]
    pub table_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Table classification: `data_table`, `lookup_table` or `configuration`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_type: Option<String>,
    #[schemars(length(min = 1))]
    pub columns: Vec<UmfColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_rules: Option<ValidationRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Relationships>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<UmfMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_metadata: Option<Map<String, Value>>,
    /// Table-level profiling run details, set by profiling enrichment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiling_metadata: Option<ProfilingMetadata>,
}

impl Umf {
    /// Column names in document order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&UmfColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut UmfColumn> {
        self.columns.iter_mut().find(|column| column.name == name)
    }

    /// Timestamp the source spreadsheet was last modified, when recorded.
    pub fn source_file_modified(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.source_file_modified.as_deref())
    }
}

/// Column definition within a UMF table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UmfColumn {
    #[schemars(regex(pattern = r"^[A-Za-z][A-Za-z0-9_]*$"), length(max = 128))]
    pub name: String,
    #[schemars(regex(
        pattern = r"^(VARCHAR|DECIMAL|INTEGER|DATE|DATETIME|BOOLEAN|TEXT|CHAR|FLOAT)$"
    ))]
    pub data_type: String,
    /// Spreadsheet column position or identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<Nullability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_values: Option<Vec<String>>,
    /// Maximum length for character columns.
    #[serde(default, alias = "max_length", skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1))]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1))]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Vendor format hint kept verbatim (date patterns, enumerations, examples).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
    /// Name before duplicate-name repair renamed the column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiling: Option<ColumnProfiling>,
}

impl UmfColumn {
    /// Minimal column with only a name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            position: None,
            description: None,
            nullable: None,
            sample_values: None,
            length: None,
            precision: None,
            scale: None,
            title: None,
            format: None,
            notes: None,
            original_name: None,
            profiling: None,
        }
    }

    /// Whether the column must never be null.
    ///
    /// Columns without nullability information are treated as nullable.
    pub fn is_required(&self) -> bool {
        self.nullable
            .as_ref()
            .is_some_and(Nullability::is_required)
    }

    /// Lines of business for which the column is required.
    pub fn required_lobs(&self) -> Vec<String> {
        match &self.nullable {
            Some(Nullability::PerLob(lobs)) => lobs.required_lobs(),
            _ => Vec::new(),
        }
    }
}

/// Nullability expressed as a single flag or per line of business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Nullability {
    Flag(bool),
    PerLob(LobNullability),
}

impl Nullability {
    pub fn is_required(&self) -> bool {
        match self {
            Nullability::Flag(nullable) => !nullable,
            Nullability::PerLob(lobs) => {
                let flags = lobs.flags();
                !flags.is_empty() && flags.iter().all(|(_, nullable)| *nullable == Some(false))
            }
        }
    }
}

/// Nullability per line of business. An absent flag is recorded as unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LobNullability {
    /// Medicaid.
    #[serde(rename = "MD", default, skip_serializing_if = "Option::is_none")]
    pub md: Option<bool>,
    /// Medicare Part D.
    #[serde(rename = "MP", default, skip_serializing_if = "Option::is_none")]
    pub mp: Option<bool>,
    /// Medicare.
    #[serde(rename = "ME", default, skip_serializing_if = "Option::is_none")]
    pub me: Option<bool>,
}

impl LobNullability {
    fn flags(&self) -> Vec<(&'static str, Option<bool>)> {
        [("MD", self.md), ("MP", self.mp), ("ME", self.me)]
            .into_iter()
            .filter(|(_, flag)| flag.is_some())
            .collect()
    }

    /// LOBs whose flag is not `true`.
    pub fn required_lobs(&self) -> Vec<String> {
        self.flags()
            .into_iter()
            .filter(|(_, nullable)| *nullable != Some(true))
            .map(|(lob, _)| lob.to_string())
            .collect()
    }
}

/// Individual validation rule attached to a table or column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationRule {
    pub rule_type: String,
    pub description: String,
    #[schemars(regex(pattern = r"^(error|warning|info)$"))]
    pub severity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_level: Option<Vec<ValidationRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_level: Option<std::collections::BTreeMap<String, Vec<ValidationRule>>>,
}

/// Foreign key relationship from this table to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0.0, max = 1.0))]
    pub confidence: Option<f64>,
    /// Legacy `table.column` form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_method: Option<String>,
}

impl ForeignKey {
    /// Referenced table, falling back to the legacy `references` field.
    pub fn target_table(&self) -> Option<&str> {
        self.references_table
            .as_deref()
            .or_else(|| self.legacy_target().map(|(table, _)| table))
    }

    /// Referenced column, falling back to the legacy `references` field.
    pub fn target_column(&self) -> Option<&str> {
        self.references_column
            .as_deref()
            .or_else(|| self.legacy_target().map(|(_, column)| column))
    }

    fn legacy_target(&self) -> Option<(&str, &str)> {
        let references = self.references.as_deref()?;
        let mut parts = references.split('.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(table), Some(column), None) => Some((table, column)),
            _ => None,
        }
    }
}

/// Reverse foreign key: another table referencing this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReferencedBy {
    pub table: String,
    pub column: String,
    pub foreign_key_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0.0, max = 1.0))]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Relationships {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_keys: Option<Vec<ForeignKey>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_by: Option<Vec<ReferencedBy>>,
    #[serde(
        default,
        alias = "suggested_indexes",
        skip_serializing_if = "Option::is_none"
    )]
    pub indexes: Option<Vec<Index>>,
}

/// Bookkeeping about who produced the document and when.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UmfMetadata {
    /// ISO-8601 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1, max = 7))]
    pub pipeline_phase: Option<u8>,
    /// ISO-8601 timestamp of the source spreadsheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file_modified: Option<String>,
}

/// Load a UMF document from a YAML file.
pub fn load_umf_from_yaml(path: &Path) -> Result<Umf> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "UMF file not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    let umf: Umf = serde_yaml::from_str(&content)?;
    tracing::debug!(event = "umf_loaded", path = %path.display(), table = %umf.table_name);
    Ok(umf)
}

/// Save a UMF document as YAML, creating parent directories.
pub fn save_umf_to_yaml(umf: &Umf, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let encoded = serde_yaml::to_string(umf)?;
    std::fs::write(path, encoded)?;
    tracing::debug!(event = "umf_saved", path = %path.display(), table = %umf.table_name);
    Ok(())
}
