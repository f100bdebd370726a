//! Draft-07 JSON Schema describing one record of a UMF table.

use serde_json::{Map, Value, json};
use tablespec_core::{Umf, map_to_json_type};

use crate::errors::Result;

pub const JSON_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

/// Sample values copied into `examples`.
pub const MAX_EXAMPLES: usize = 3;

/// Build the schema document.
pub fn generate_json_schema(umf: &Umf) -> Value {
    let table = umf.table_name.as_str();
    let mut properties = Map::new();
    let mut required = Vec::new();

    for column in &umf.columns {
        let mut property = Map::new();
        property.insert("type".to_string(), json!(map_to_json_type(&column.data_type)));
        property.insert(
            "description".to_string(),
            json!(column.description.as_deref().unwrap_or_default()),
        );
        if let Some(length) = column.length {
            property.insert("maxLength".to_string(), json!(length));
        }
        if let Some(samples) = column.sample_values.as_ref().filter(|samples| !samples.is_empty()) {
            let examples: Vec<&String> = samples.iter().take(MAX_EXAMPLES).collect();
            property.insert("examples".to_string(), json!(examples));
        }
        properties.insert(column.name.clone(), Value::Object(property));

        if column.is_required() {
            required.push(column.name.clone());
        }
    }

    let description = umf
        .description
        .clone()
        .unwrap_or_else(|| format!("Schema for {table} table"));

    json!({
        "$schema": JSON_SCHEMA_DRAFT,
        "title": format!("{table} Schema"),
        "type": "object",
        "description": description,
        "properties": properties,
        "required": required,
    })
}

/// Pretty-printed form of [`generate_json_schema`].
pub fn render_json_schema(umf: &Umf) -> Result<String> {
    Ok(serde_json::to_string_pretty(&generate_json_schema(umf))?)
}
