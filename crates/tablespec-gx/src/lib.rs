//! Expectation suites and sample synthesis for tablespec.
//!
//! This crate derives baseline expectation suites from UMF documents, mines
//! per-column constraints out of existing suites, and synthesizes example
//! values from the regex patterns those suites carry. Suites from other tools
//! are format-checked and merged with the baseline before they are stored.

pub mod baseline;
pub mod constraints;
pub mod errors;
pub mod loader;
pub mod pattern;
pub mod processor;
pub mod suite;

pub use baseline::{
    Strictness, build_expectation_suite, generate_baseline_column_expectations,
    generate_baseline_expectations, generate_profiling_expectations,
};
pub use constraints::{
    ColumnConstraints, ColumnHints, extract_column_constraints, extract_description_examples,
    extract_metadata_hints, extract_regex_patterns, extract_strftime_formats, extract_value_sets,
    get_constraints_for_column, get_regex_for_column, get_strftime_format_for_column,
    looks_like_column_name, sample_value_for_column,
};
pub use errors::{GxError, Result};
pub use loader::{
    load_expectations_for_table, read_suite_file, save_expectation_suite, save_suite_document,
    suite_path,
};
pub use pattern::{generate_sample, generate_sample_with, sample_char};
pub use processor::{
    VALID_SEVERITIES, expectation_signature, merge_baseline_expectations, validate_suite_format,
};
pub use suite::{Expectation, ExpectationSuite, RawExpectation, raw_expectations};
