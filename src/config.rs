use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GraphConfig {
    /// Abort the load on a malformed reference instead of skipping the line.
    pub strict_references: bool,
    pub minify_json: bool,
    pub gzip_json: bool,
    pub schema_version: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            strict_references: false,
            minify_json: false,
            gzip_json: false,
            schema_version: "1.0".to_string(),
        }
    }
}

impl GraphConfig {
    pub fn new(strict_references: bool, minify_json: bool, gzip_json: bool, schema_version: &str) -> Self {
        GraphConfig {
            strict_references,
            minify_json,
            gzip_json,
            schema_version: schema_version.to_string(),
        }
    }
}
