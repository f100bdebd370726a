//! Core contracts and helpers for tablespec.
//!
//! This crate defines the UMF document model, type mappings, validation
//! helpers, and profiling mappers shared by the expectation tooling, schema
//! emitters, and the CLI.

pub mod error;
pub mod profiling;
pub mod types;
pub mod umf;
pub mod validation;

pub use error::{Error, Result};
pub use profiling::{
    ColumnProfile, ColumnProfiling, ColumnStatistics, DataFrameProfile, EngineField,
    ProfilingMetadata, enrich_umf_with_profiling, map_engine_type, map_fields_to_umf,
};
pub use types::{map_to_gx_spark_type, map_to_json_type, map_to_pyspark_type};
pub use umf::{
    ForeignKey, Index, LobNullability, Nullability, ReferencedBy, Relationships, Umf, UmfColumn,
    UmfMetadata, ValidationRule, ValidationRules, load_umf_from_yaml, save_umf_to_yaml,
};
pub use validation::{
    IssueSeverity, SpecDefaults, UMF_FILE_SUFFIX, ValidationIssue, ValidationReport,
    apply_default_specifications, fix_duplicate_column_names, umf_json_schema, validate_umf,
    validate_umf_directory, validate_umf_file, validate_umf_json,
};

/// Current UMF format version written by tablespec.
pub const UMF_VERSION: &str = "1.0";
