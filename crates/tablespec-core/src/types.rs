//! UMF data type mappings to downstream type systems.
//!
//! Lookups are case-insensitive and fall back to the string type of the
//! target system for anything unknown.

/// Spark type name expected by `expect_column_values_to_be_of_type`.
///
/// DATE maps to `StringType` because dates are stored as `YYYYMMDD` strings.
pub fn map_to_gx_spark_type(data_type: &str) -> &'static str {
    match data_type.to_uppercase().as_str() {
        "VARCHAR" | "STRING" => "StringType",
        "INTEGER" | "INT" => "IntegerType",
        "BIGINT" => "LongType",
        "SMALLINT" => "ShortType",
        "TINYINT" => "ByteType",
        "DECIMAL" => "DecimalType",
        "FLOAT" => "FloatType",
        "DOUBLE" => "DoubleType",
        "BOOLEAN" => "BooleanType",
        "DATE" => "StringType",
        "TIMESTAMP" => "TimestampType",
        _ => "StringType",
    }
}

/// PySpark type constructor for `StructField` definitions.
pub fn map_to_pyspark_type(data_type: &str) -> String {
    format!("{}()", map_to_gx_spark_type(data_type))
}

/// JSON Schema primitive type for a UMF data type.
pub fn map_to_json_type(data_type: &str) -> &'static str {
    match data_type.to_uppercase().as_str() {
        "INTEGER" | "INT" | "BIGINT" => "integer",
        "DECIMAL" | "FLOAT" | "DOUBLE" => "number",
        "BOOLEAN" => "boolean",
        _ => "string",
    }
}
