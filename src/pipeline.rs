use crate::config::GraphConfig;
use crate::graph::BibleGraph;
use crate::json_generator::GraphJsonGenerator;
use crate::loader::{DatasetLoader, LoadReport};
use crate::logger::*;
use crate::manifest_generator::ManifestGenerator;
use crate::models::*;
use anyhow::{Context, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

/// At most this many skipped lines are logged one by one; the rest are
/// only counted.
const MAX_LOGGED_SKIPS: usize = 200;

pub struct ProcessingPipeline {
    pub loader: DatasetLoader,
    pub logger: DiagnosticLogger,
    pub config: GraphConfig,
}

#[derive(Debug)]
pub struct BuildOutput {
    pub graph: BibleGraph,
    pub summary: GraphSummary,
    pub graph_path: PathBuf,
    pub manifest_path: PathBuf,
}

impl ProcessingPipeline {
    pub fn new(config: GraphConfig, log_dir: &Path) -> Result<Self> {
        Ok(ProcessingPipeline {
            loader: DatasetLoader::new(&config).context("Failed to create DatasetLoader")?,
            logger: DiagnosticLogger::new(log_dir).context("Failed to create DiagnosticLogger")?,
            config,
        })
    }

    pub fn load(&self, input: &Path) -> Result<LoadReport> {
        self.logger.info(format!("Loading cross-references from {}", input.display()));

        let report = self.loader.load_file(input)?;

        for skipped in report.skipped.iter().take(MAX_LOGGED_SKIPS) {
            self.logger.warning(
                format!("Skipped line {}: {}", skipped.line_number, skipped.reason),
                Some(skipped.context()),
            );
        }
        if report.skipped.len() > MAX_LOGGED_SKIPS {
            self.logger.warning(
                format!(
                    "{} further skipped lines not logged individually",
                    report.skipped.len() - MAX_LOGGED_SKIPS
                ),
                None,
            );
        }

        self.logger.info(format!(
            "Read {} records: {} weighted pairs, {} lines skipped",
            report.records_read,
            report.weights.len(),
            report.skipped.len()
        ));

        Ok(report)
    }

    pub fn build_graph(&self, report: &LoadReport) -> (BibleGraph, GraphSummary) {
        let (graph, warnings) = BibleGraph::from_weights(&report.weights);

        for warning in &warnings {
            self.logger.warning(
                warning.error.to_string(),
                Some(json!({ "pair": warning.pair })),
            );
        }

        self.logger.info(format!(
            "Built graph: {} verses, {} edges, {} books",
            graph.node_count(),
            graph.edges().len(),
            graph.books().len()
        ));

        let summary = GraphSummary {
            records_read: report.records_read,
            lines_skipped: report.skipped.len(),
            weighted_pairs: report.weights.len(),
            graph_warnings: warnings.len(),
        };

        (graph, summary)
    }

    /// Load, build, and write `graph.json` plus `manifest.json` into `out`.
    pub fn run(&self, input: &Path, out: &Path) -> Result<BuildOutput> {
        let report = self.load(input)?;
        let (graph, summary) = self.build_graph(&report);

        let json_generator = GraphJsonGenerator::new(
            out,
            self.logger.clone(),
            self.config.minify_json,
            self.config.gzip_json,
        )?;
        let graph_json =
            GraphJsonGenerator::build_graph_json(&graph, &summary, &self.config.schema_version);
        let (graph_path, graph_sha256) = json_generator
            .generate_graph_json(&graph_json)
            .context("Failed to generate graph.json")?;
        let manifest_generator = ManifestGenerator::new(out, self.logger.clone());
        let manifest = manifest_generator
            .generate_manifest(input, &graph_sha256, &graph_json, &self.config)
            .context("Failed to generate manifest")?;
        let manifest_path = manifest_generator
            .save_manifest(&manifest, self.config.minify_json)
            .context("Failed to save manifest")?;

        Ok(BuildOutput {
            graph,
            summary,
            graph_path,
            manifest_path,
        })
    }

    pub fn finalize(&self, output: &BuildOutput) -> Result<DiagnosticReport> {
        let stats = GraphStats {
            records: output.summary.records_read,
            skipped_lines: output.summary.lines_skipped,
            pairs: output.summary.weighted_pairs,
            nodes: output.graph.node_count(),
            edges: output.graph.edges().len(),
        };
        self.logger.generate_report(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::SAMPLE_DATASET;
    use crate::schema::generate_schemas;
    use crate::validator::BuildValidator;
    use std::fs;
    use tempfile::TempDir;

    fn write_dataset(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("cross_references.txt");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_run_writes_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_dataset(temp_dir.path(), SAMPLE_DATASET);
        let out = temp_dir.path().join("out");
        generate_schemas(&out.join("schema")).unwrap();

        let pipeline =
            ProcessingPipeline::new(GraphConfig::default(), &temp_dir.path().join("logs")).unwrap();
        let output = pipeline.run(&input, &out).unwrap();

        assert!(output.graph_path.exists());
        assert!(output.manifest_path.exists());
        assert_eq!(output.summary.records_read, 8);
        assert_eq!(output.summary.lines_skipped, 3);
        assert_eq!(output.summary.weighted_pairs, 6);
        assert_eq!(output.summary.graph_warnings, 1);

        // 3 skipped lines + 1 degenerate pair
        assert_eq!(pipeline.logger.warning_count(), 4);

        let validator = BuildValidator::new(&out, pipeline.logger.clone());
        assert!(validator.validate_all_json_files().unwrap());
        assert!(validator.check_graph_consistency().unwrap());

        let report = pipeline.finalize(&output).unwrap();
        assert_eq!(report.summary.errors, 0);
        assert_eq!(report.summary.processed.nodes, 6);
        assert_eq!(report.summary.processed.edges, 5);
    }

    #[test]
    fn test_strict_mode_aborts_on_malformed_reference() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_dataset(temp_dir.path(), SAMPLE_DATASET);
        let config = GraphConfig {
            strict_references: true,
            ..GraphConfig::default()
        };

        let pipeline = ProcessingPipeline::new(config, &temp_dir.path().join("logs")).unwrap();
        let err = pipeline.run(&input, &temp_dir.path().join("out")).unwrap_err();
        assert!(format!("{:#}", err).contains("Malformed reference"));
        assert!(!temp_dir.path().join("out").join("graph.json").exists());
    }

    #[test]
    fn test_skip_logging_is_capped() {
        let temp_dir = TempDir::new().unwrap();
        let mut content = String::from("header\n");
        for _ in 0..(MAX_LOGGED_SKIPS + 5) {
            content.push_str("Gen.1.1 Gen.1.2\n");
        }
        let input = write_dataset(temp_dir.path(), &content);

        let pipeline =
            ProcessingPipeline::new(GraphConfig::default(), &temp_dir.path().join("logs")).unwrap();
        let report = pipeline.load(&input).unwrap();

        assert_eq!(report.skipped.len(), MAX_LOGGED_SKIPS + 5);
        assert_eq!(pipeline.logger.warning_count(), MAX_LOGGED_SKIPS + 1);
    }
}
