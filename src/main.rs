mod cli;
mod config;
mod error;
#[cfg(test)]
mod fixtures;
mod graph;
mod json_generator;
mod loader;
mod logger;
mod manifest_generator;
mod models;
mod pipeline;
mod reference;
mod schema;
mod validator;

use crate::cli::Cli;
use crate::config::GraphConfig;
use crate::logger::DiagnosticLogger;
use crate::pipeline::ProcessingPipeline;
use crate::validator::BuildValidator;
use anyhow::{Context, Result};
use std::fs;

fn main() -> Result<()> {
    let cli = Cli::parse();

    println!("Cross-reference graph builder starting...");

    let log_dir = cli.log_dir.as_path();

    if cli.validate_only {
        println!("Validation-only mode: checking {:?}...", cli.out);
        let logger = DiagnosticLogger::new(log_dir).context("Failed to create logger")?;
        let validator = BuildValidator::new(&cli.out, logger);
        let schemas_ok = validator.validate_all_json_files()?;
        let graph_ok = validator.check_graph_consistency()?;
        if !(schemas_ok && graph_ok) {
            anyhow::bail!("Validation failed for {:?}", cli.out);
        }
        println!("Validation passed");
        return Ok(());
    }

    let input = cli
        .input
        .as_deref()
        .context("No dataset provided. Use --input to specify the cross-reference file.")?;

    let output_dir = &cli.out;
    let schema_dir = output_dir.join("schema");
    fs::create_dir_all(&schema_dir).context("Failed to create schema directory")?;
    schema::generate_schemas(&schema_dir)
        .map_err(|e| anyhow::anyhow!("Schema generation failed: {}", e))?;

    println!("Input: {:?}", input);
    println!("Output directory: {:?}", output_dir);
    println!("Log directory: {:?}", log_dir);

    let config = GraphConfig::new(
        cli.strict_references,
        cli.minify_json,
        cli.gzip_json,
        &cli.schema_version,
    );
    let pipeline = ProcessingPipeline::new(config, log_dir).context("Failed to create pipeline")?;
    println!("Build id: {}", pipeline.logger.build_id());

    let output = pipeline
        .run(input, output_dir)
        .with_context(|| format!("Failed to build graph from {:?}", input))?;

    if output.graph.is_empty() {
        eprintln!("Warning: no cross-references were accepted from {:?}", input);
    }

    println!("Unique verses: {}", output.graph.node_count());
    println!("Edges: {}", output.graph.edges().len());
    println!("Books: {}", output.graph.books().len());
    println!("Edge samples: {:?}", &output.graph.edges()[..output.graph.edges().len().min(10)]);
    let degrees = output.graph.degrees();
    if let Some((index, degree)) = degrees.iter().enumerate().max_by_key(|&(_, d)| *d) {
        if let Some(verse) = output.graph.verse(index) {
            println!("Most connected verse: {} ({} edges)", verse.osis(), degree);
        }
    }
    println!("Wrote {:?} and {:?}", output.graph_path, output.manifest_path);

    println!("Running validation checks...");
    let validator = BuildValidator::new(output_dir, pipeline.logger.clone());
    if !validator.validate_all_json_files()? {
        anyhow::bail!("Schema validation failed for {:?}", output_dir);
    }
    if !validator.check_graph_consistency()? {
        anyhow::bail!("Graph consistency check failed for {:?}", output_dir);
    }
    println!("Output hash: {}", validator.check_determinism()?);

    let report = pipeline.finalize(&output)?;
    println!("Build complete!");
    println!("Errors: {}, Warnings: {}", report.summary.errors, report.summary.warnings);
    println!("Build log: {:?}", pipeline.logger.log_path());

    pipeline
        .logger
        .rotate_logs(cli.max_log_builds)
        .context("Failed to rotate logs")?;

    Ok(())
}
