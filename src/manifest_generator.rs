use crate::config::GraphConfig;
use crate::logger::*;
use crate::models::*;
use crate::schema::{validate_json, GRAPH_SCHEMA, MANIFEST_SCHEMA};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

pub struct ManifestGenerator {
    output_base: PathBuf,
    logger: DiagnosticLogger,
    build_timestamp: String,
}

impl ManifestGenerator {
    pub fn new(output_dir: &Path, logger: DiagnosticLogger) -> Self {
        Self::with_timestamp(output_dir, logger, Utc::now())
    }

    pub fn with_timestamp(output_dir: &Path, logger: DiagnosticLogger, timestamp: DateTime<Utc>) -> Self {
        ManifestGenerator {
            output_base: output_dir.to_path_buf(),
            logger,
            build_timestamp: Self::normalize_timestamp(&timestamp),
        }
    }

    pub fn normalize_timestamp(dt: &DateTime<Utc>) -> String {
        dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    pub fn generate_manifest(
        &self,
        source_file: &Path,
        graph_sha256: &str,
        graph: &GraphJson,
        config: &GraphConfig,
    ) -> Result<BuildManifest> {
        let source_sha256 = Self::compute_file_checksum(source_file)?;
        let source_name = source_file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let mut schema_locations = BTreeMap::new();
        schema_locations.insert("graph".to_string(), format!("/schema/{}", GRAPH_SCHEMA));
        schema_locations.insert("manifest".to_string(), format!("/schema/{}", MANIFEST_SCHEMA));

        Ok(BuildManifest {
            schema_version: config.schema_version.clone(),
            build_timestamp: self.build_timestamp.clone(),
            source_file: source_name,
            source_sha256,
            graph_sha256: graph_sha256.to_string(),
            node_count: graph.node_count,
            edge_count: graph.edge_count,
            summary: graph.summary.clone(),
            config: config.clone(),
            schema_locations,
            extensions: json!({}),
        })
    }

    pub fn save_manifest(&self, manifest: &BuildManifest, minify: bool) -> Result<PathBuf> {
        let output_path = self.output_base.join("manifest.json");

        let json_str = if minify {
            serde_json::to_string(manifest)?
        } else {
            serde_json::to_string_pretty(manifest)?
        };

        let schema_path = self.output_base.join("schema").join(MANIFEST_SCHEMA);
        if schema_path.exists() {
            let json_value: Value = serde_json::from_str(&json_str)?;
            if let Err(e) = validate_json(&json_value, &schema_path) {
                self.logger.warning(format!("Manifest schema validation warning: {}", e), None);
            }
        }

        fs::write(&output_path, &json_str).context("Failed to write manifest.json")?;

        self.logger.info(format!(
            "Generated manifest.json ({} bytes, SHA-256: {})",
            json_str.len(),
            Self::hash_manifest(&json_str)
        ));

        Ok(output_path)
    }

    pub fn hash_manifest(json: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn compute_file_checksum(file_path: &Path) -> Result<String> {
        let mut file = fs::File::open(file_path)
            .with_context(|| format!("Failed to open file for checksum: {:?}", file_path))?;

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .context("Failed to read file for checksum")?;

        let mut hasher = Sha256::new();
        hasher.update(&buffer);
        Ok(format!("{:x}", hasher.finalize()))
    }
}
