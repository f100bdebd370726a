//! Provenance timestamps written into generated file headers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tablespec_core::Umf;

use crate::errors::{Result, SchemaError};

pub const HEADER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse an ISO-8601 timestamp as recorded in UMF metadata.
///
/// Offsets are honored by keeping the local wall-clock time; a bare date
/// reads as midnight.
pub fn parse_iso_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(timestamp);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Source modification time when recorded, otherwise the current UTC time.
pub(crate) fn source_timestamp(umf: &Umf) -> Result<String> {
    let Some(raw) = umf.source_file_modified() else {
        return Ok(Utc::now().format(HEADER_TIMESTAMP_FORMAT).to_string());
    };
    parse_iso_timestamp(raw)
        .map(|timestamp| timestamp.format(HEADER_TIMESTAMP_FORMAT).to_string())
        .ok_or_else(|| SchemaError::InvalidTimestamp(raw.to_string()))
}
