//! PySpark `StructType` source for UMF tables.

use tablespec_core::{Umf, map_to_pyspark_type};

use crate::errors::Result;
use crate::header::source_timestamp;

const IMPORTS: [&str; 3] = [
    "from pyspark.sql.types import StructType, StructField",
    "from pyspark.sql.types import StringType, IntegerType, LongType, DecimalType",
    "from pyspark.sql.types import FloatType, DoubleType, BooleanType, DateType, TimestampType",
];

/// Render a Python module defining `<table>_schema`.
pub fn generate_pyspark_schema(umf: &Umf) -> Result<String> {
    let table = umf.table_name.as_str();
    let timestamp = source_timestamp(umf)?;

    let mut lines = vec![
        format!("# PySpark Schema for {table}"),
        "# Generated from UMF specification".to_string(),
        format!("# Source file modified: {timestamp}"),
        String::new(),
    ];
    lines.extend(IMPORTS.iter().map(|line| line.to_string()));
    lines.push(String::new());
    lines.push(format!("{}_schema = StructType([", table.to_lowercase()));

    let fields: Vec<String> = umf
        .columns
        .iter()
        .map(|column| {
            let nullable = if column.is_required() { "False" } else { "True" };
            format!(
                "    StructField(\"{}\", {}, {nullable})",
                column.name,
                map_to_pyspark_type(&column.data_type)
            )
        })
        .collect();
    lines.push(fields.join(",\n"));
    lines.push("])".to_string());

    tracing::debug!(event = "pyspark_schema_generated", table = %table);
    Ok(lines.join("\n"))
}
