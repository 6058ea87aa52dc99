use crate::graph::BibleGraph;
use crate::logger::*;
use crate::models::*;
use crate::schema::{validate_json, GRAPH_SCHEMA};
use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes the layout/plot hand-off document.
pub struct GraphJsonGenerator {
    output_base: PathBuf,
    logger: DiagnosticLogger,
    minify: bool,
    compress: bool,
}

impl GraphJsonGenerator {
    pub fn new(output_dir: &Path, logger: DiagnosticLogger, minify: bool, compress: bool) -> Result<Self> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

        Ok(GraphJsonGenerator {
            output_base: output_dir.to_path_buf(),
            logger,
            minify,
            compress,
        })
    }

    pub fn build_graph_json(graph: &BibleGraph, summary: &GraphSummary, schema_version: &str) -> GraphJson {
        GraphJson {
            schema_version: schema_version.to_string(),
            node_count: graph.node_count(),
            edge_count: graph.edges().len(),
            node_labels: graph.node_labels(),
            node_groups: graph.node_groups(),
            books: graph.books(),
            edges: graph.edges().iter().map(|&(from, to)| [from, to]).collect(),
            summary: summary.clone(),
            extensions: json!({}),
        }
    }

    /// Writes `graph.json` and returns its path with the SHA-256 of its bytes.
    pub fn generate_graph_json(&self, graph_json: &GraphJson) -> Result<(PathBuf, String)> {
        let output_path = self.output_base.join("graph.json");
        let json_str = self.render(graph_json)?;

        let json_value: Value = serde_json::from_str(&json_str)?;
        self.check_schema(GRAPH_SCHEMA, &json_value);

        fs::write(&output_path, &json_str).context("Failed to write graph.json")?;

        if self.compress {
            self.compress_json(&output_path)?;
        }

        self.logger.info(format!(
            "Generated graph.json: {} nodes, {} edges ({} bytes)",
            graph_json.node_count,
            graph_json.edge_count,
            json_str.len()
        ));

        Ok((output_path, Self::hash_json(&json_str)))
    }

    pub fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        let json_str = if self.minify {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json_str)
    }

    /// Schema mismatches are logged, not fatal.
    fn check_schema(&self, schema_name: &str, json_value: &Value) {
        let schema_path = self.output_base.join("schema").join(schema_name);
        if !schema_path.exists() {
            return;
        }
        if let Err(e) = validate_json(json_value, &schema_path) {
            self.logger.warning(
                format!("Schema validation warning for {}: {}", schema_name, e),
                None,
            );
        }
    }

    fn compress_json(&self, json_path: &Path) -> Result<PathBuf> {
        let gz_path = json_path.with_extension("json.gz");

        let json_content = fs::read(json_path).context("Failed to read JSON for compression")?;

        let mut encoder = GzEncoder::new(
            fs::File::create(&gz_path).context("Failed to create compressed file")?,
            Compression::default(),
        );

        encoder
            .write_all(&json_content)
            .context("Failed to write compressed data")?;

        encoder.finish().context("Failed to finalize compression")?;

        let original_size = json_content.len();
        let compressed_size = fs::metadata(&gz_path)?.len() as usize;
        if original_size > 0 {
            let ratio = (1.0 - compressed_size as f64 / original_size as f64) * 100.0;
            self.logger.info(format!(
                "Compressed {} -> {} ({:.1}% reduction)",
                json_path.display(),
                gz_path.display(),
                ratio
            ));
        }

        Ok(gz_path)
    }

    pub fn hash_json(json: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
