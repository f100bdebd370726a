//! Downstream schema artifacts rendered from UMF documents.
//!
//! Each emitter is a pure function of the UMF document apart from the header
//! timestamp, which falls back to the current time when the document does not
//! record when its source was modified.

pub mod errors;
pub mod header;
pub mod json_schema;
pub mod pyspark;
pub mod sql;

pub use errors::{Result, SchemaError};
pub use header::{HEADER_TIMESTAMP_FORMAT, parse_iso_timestamp};
pub use json_schema::{generate_json_schema, render_json_schema};
pub use pyspark::generate_pyspark_schema;
pub use sql::generate_sql_ddl;
