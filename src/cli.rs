use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "crossref-graph")]
#[command(about = "Build a verse graph from a Bible cross-reference dataset", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        required_unless_present = "validate_only",
        help = "Cross-reference dataset (header line, then <from> <to> <votes>)"
    )]
    pub input: Option<PathBuf>,

    #[arg(long, default_value = "out", help = "Output directory")]
    pub out: PathBuf,

    #[arg(long, default_value = "logs", help = "Log directory")]
    pub log_dir: PathBuf,

    #[arg(long, help = "Abort on malformed references instead of skipping the line")]
    pub strict_references: bool,

    #[arg(long, help = "Minify JSON output")]
    pub minify_json: bool,

    #[arg(long, help = "Compress JSON with gzip")]
    pub gzip_json: bool,

    #[arg(long, help = "Validate an existing output directory (no generation)")]
    pub validate_only: bool,

    #[arg(long, default_value = "1.0", help = "Schema version")]
    pub schema_version: String,

    #[arg(long, default_value_t = 10, help = "Number of build logs to keep")]
    pub max_log_builds: usize,
}

impl Cli {
    pub fn parse() -> Self {
        Parser::parse()
    }
}
