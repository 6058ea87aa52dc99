use crate::logger::*;
use crate::models::GraphJson;
use crate::schema::{validate_json, GRAPH_SCHEMA, MANIFEST_SCHEMA};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Post-build checks over an output directory.
pub struct BuildValidator {
    output_base: PathBuf,
    logger: DiagnosticLogger,
}

impl BuildValidator {
    pub fn new(output_dir: &Path, logger: DiagnosticLogger) -> Self {
        BuildValidator {
            output_base: output_dir.to_path_buf(),
            logger,
        }
    }

    pub fn validate_all_json_files(&self) -> Result<bool> {
        self.logger.info("Validating all JSON files against schemas...".to_string());

        let mut all_valid = true;
        for (file_name, schema_name) in [("graph.json", GRAPH_SCHEMA), ("manifest.json", MANIFEST_SCHEMA)] {
            let path = self.output_base.join(file_name);
            if !path.exists() {
                self.logger.warning(format!("{} not found", file_name), None);
                all_valid = false;
                continue;
            }
            if !self.validate_json_file(&path, schema_name) {
                all_valid = false;
            }
        }

        if all_valid {
            self.logger.info("All JSON files validated successfully".to_string());
        } else {
            self.logger.error("Some JSON files failed validation".to_string(), None);
        }

        Ok(all_valid)
    }

    fn validate_json_file(&self, file_path: &Path, schema_name: &str) -> bool {
        let json_value = match Self::read_json(file_path) {
            Ok(v) => v,
            Err(e) => {
                self.logger.error(format!("{:#}", e), None);
                return false;
            }
        };

        let schema_path = self.output_base.join("schema").join(schema_name);
        if !schema_path.exists() {
            self.logger.warning(
                format!("Schema {} not found, skipping validation", schema_name),
                None,
            );
            return true;
        }

        match validate_json(&json_value, &schema_path) {
            Ok(()) => {
                self.logger.info(format!("✓ {} validated", file_path.display()));
                true
            }
            Err(e) => {
                self.logger.error(
                    format!("✗ {} validation failed: {}", file_path.display(), e),
                    None,
                );
                false
            }
        }
    }

    /// Checks `graph.json` against the invariants the layout step relies on:
    /// per-node tables sized to `node_count`, distinct labels, edge endpoints
    /// in range.
    pub fn check_graph_consistency(&self) -> Result<bool> {
        self.logger.info("Checking graph consistency...".to_string());

        let path = self.output_base.join("graph.json");
        let graph: GraphJson = serde_json::from_value(Self::read_json(&path)?)
            .with_context(|| format!("Failed to decode {}", path.display()))?;

        let mut problems = Vec::new();

        if graph.node_labels.len() != graph.node_count {
            problems.push(format!(
                "node_labels has {} entries, expected {}",
                graph.node_labels.len(),
                graph.node_count
            ));
        }
        if graph.node_groups.len() != graph.node_count {
            problems.push(format!(
                "node_groups has {} entries, expected {}",
                graph.node_groups.len(),
                graph.node_count
            ));
        }
        if graph.edges.len() != graph.edge_count {
            problems.push(format!(
                "edges has {} entries, expected {}",
                graph.edges.len(),
                graph.edge_count
            ));
        }

        let distinct: HashSet<&String> = graph.node_labels.iter().collect();
        if distinct.len() != graph.node_labels.len() {
            problems.push("node_labels contains duplicates".to_string());
        }

        if let Some(group) = graph.node_groups.iter().find(|&&g| g >= graph.books.len()) {
            problems.push(format!("node group {} has no book", group));
        }

        let out_of_range = graph
            .edges
            .iter()
            .filter(|[from, to]| *from >= graph.node_count || *to >= graph.node_count)
            .count();
        if out_of_range > 0 {
            problems.push(format!("{} edges reference unknown nodes", out_of_range));
        }

        for problem in &problems {
            self.logger.error(
                format!("Graph inconsistency: {}", problem),
                Some(json!({"file": path.display().to_string()})),
            );
        }

        if problems.is_empty() {
            self.logger.info("Graph is consistent".to_string());
        }

        Ok(problems.is_empty())
    }

    /// Hash over every output file except logs and `manifest.json`, whose
    /// build timestamp differs between runs. Sorted by relative path.
    pub fn check_determinism(&self) -> Result<String> {
        self.logger.info("Checking determinism...".to_string());

        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.output_base) {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file()
                || path.extension().map_or(false, |e| e == "jsonl")
                || path.file_name().map_or(false, |n| n == "manifest.json")
            {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&self.output_base) {
                let content = fs::read(entry.path())?;
                entries.push((rel.to_path_buf(), content));
            }
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut hasher = Sha256::new();
        for (path, content) in &entries {
            hasher.update(path.to_string_lossy().as_bytes());
            hasher.update(content);
        }
        let hash = format!("{:x}", hasher.finalize());
        self.logger.info(format!("Deterministic hash: {}", hash));
        Ok(hash)
    }

    fn read_json(path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}
