use crate::models::*;
use schemars::schema_for;
use std::fs;
use std::path::Path;

pub const GRAPH_SCHEMA: &str = "graph-1.0.json";
pub const MANIFEST_SCHEMA: &str = "manifest-1.0.json";

/// Generate all JSON schemas
pub fn generate_schemas(schema_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(schema_dir)?;

    let graph_schema = schema_for!(GraphJson);
    let graph_json = serde_json::to_string_pretty(&graph_schema)?;
    fs::write(schema_dir.join(GRAPH_SCHEMA), graph_json)?;

    let manifest_schema = schema_for!(BuildManifest);
    let manifest_json = serde_json::to_string_pretty(&manifest_schema)?;
    fs::write(schema_dir.join(MANIFEST_SCHEMA), manifest_json)?;

    Ok(())
}

/// Validate JSON against schema
pub fn validate_json(json: &serde_json::Value, schema_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    use jsonschema::JSONSchema;

    let schema_content = fs::read_to_string(schema_path)?;
    let schema_json: serde_json::Value = serde_json::from_str(&schema_content)?;

    // errors borrow both the schema and the instance
    let compiled = JSONSchema::compile(&schema_json)
        .map_err(|e| format!("Failed to compile schema: {:?}", e))?;

    let error_msgs: Vec<String> = match compiled.validate(json) {
        Ok(()) => return Ok(()),
        Err(errors) => errors.map(|e| format!("{}", e)).collect(),
    };

    Err(format!("Validation error: {}", error_msgs.join("; ")).into())
}
