//! SQL DDL for UMF tables.

use tablespec_core::{Umf, UmfColumn};

use crate::errors::Result;
use crate::header::source_timestamp;

/// Longest comment accepted by the target catalogs.
pub const MAX_COMMENT_LEN: usize = 255;

/// Render a `CREATE TABLE` statement, followed by any suggested indexes.
pub fn generate_sql_ddl(umf: &Umf) -> Result<String> {
    let table = umf.table_name.as_str();
    let timestamp = source_timestamp(umf)?;

    let mut lines = vec![
        format!("-- DDL for {table}"),
        "-- Generated from UMF specification".to_string(),
        format!("-- Source file modified: {timestamp}"),
        String::new(),
        format!("CREATE TABLE {table} ("),
    ];

    let columns: Vec<String> = umf.columns.iter().map(column_definition).collect();
    lines.push(columns.join(",\n"));
    lines.push(")".to_string());

    if let Some(description) = umf.description.as_deref().filter(|text| !text.is_empty()) {
        lines.push(format!("COMMENT '{}'", sql_comment(description)));
    }
    lines.push(";".to_string());

    let indexes = umf
        .relationships
        .as_ref()
        .and_then(|relationships| relationships.indexes.as_deref())
        .unwrap_or_default();
    if !indexes.is_empty() {
        lines.push(String::new());
        lines.push("-- Suggested Indexes".to_string());
        for index in indexes {
            let keyword = if index.unique { "CREATE UNIQUE INDEX" } else { "CREATE INDEX" };
            lines.push(format!(
                "{keyword} {} ON {table} ({});",
                index.name,
                index.columns.join(", ")
            ));
        }
    }

    tracing::debug!(event = "ddl_generated", table = %table, columns = umf.columns.len());
    Ok(lines.join("\n"))
}

fn column_definition(column: &UmfColumn) -> String {
    let mut definition = format!("    {} {}", column.name, sql_type(column));
    if column.is_required() {
        definition.push_str(" NOT NULL");
    }
    if let Some(description) = column.description.as_deref().filter(|text| !text.is_empty()) {
        definition.push_str(&format!(" COMMENT '{}'", sql_comment(description)));
    }
    definition
}

fn sql_type(column: &UmfColumn) -> String {
    let data_type = column.data_type.to_uppercase();
    match data_type.as_str() {
        "VARCHAR" => match column.length {
            Some(length) => format!("VARCHAR({length})"),
            // Spark SQL rejects VARCHAR without a size.
            None => "STRING".to_string(),
        },
        "DECIMAL" => match column.precision {
            Some(precision) => format!("DECIMAL({precision},{})", column.scale.unwrap_or(0)),
            None => data_type,
        },
        _ => data_type,
    }
}

/// Truncate to [`MAX_COMMENT_LEN`] characters, then double single quotes.
fn sql_comment(text: &str) -> String {
    let truncated: String = text.chars().take(MAX_COMMENT_LEN).collect();
    truncated.replace('\'', "''")
}
