use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub build_id: String,
    pub timestamp: String,
    pub summary: ReportSummary,
    pub entries: Vec<LogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub errors: usize,
    pub warnings: usize,
    pub processed: GraphStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub records: usize,
    pub skipped_lines: usize,
    pub pairs: usize,
    pub nodes: usize,
    pub edges: usize,
}

#[derive(Default)]
struct Counters {
    errors: usize,
    warnings: usize,
}

/// Build log written as one JSON object per line to
/// `<log_dir>/build-<id>.jsonl`. Clones share the same file and counters.
#[derive(Clone)]
pub struct DiagnosticLogger {
    log_dir: PathBuf,
    log_file: Arc<Mutex<Option<BufWriter<File>>>>,
    build_id: String,
    entries: Arc<Mutex<Vec<LogEntry>>>,
    counters: Arc<Mutex<Counters>>,
}

impl DiagnosticLogger {
    pub fn new(log_dir: &Path) -> Result<Self> {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {:?}", log_dir))?;

        let build_id = Utc::now().format("%Y%m%d-%H%M%S%.3f").to_string();
        let log_file_path = log_dir.join(format!("build-{}.jsonl", build_id));

        let log_file = BufWriter::new(
            File::create(&log_file_path)
                .with_context(|| format!("Failed to create log file: {:?}", log_file_path))?,
        );

        Ok(DiagnosticLogger {
            log_dir: log_dir.to_path_buf(),
            log_file: Arc::new(Mutex::new(Some(log_file))),
            build_id,
            entries: Arc::new(Mutex::new(Vec::new())),
            counters: Arc::new(Mutex::new(Counters::default())),
        })
    }

    pub fn log(&self, level: LogLevel, message: String, context: Option<serde_json::Value>) {
        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            level,
            message,
            context,
        };

        if let Ok(mut counters) = self.counters.lock() {
            match level {
                LogLevel::Error => counters.errors += 1,
                LogLevel::Warning => counters.warnings += 1,
                LogLevel::Info => {}
            }
        }

        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                if let Ok(json) = serde_json::to_string(&entry) {
                    let _ = writeln!(file, "{}", json);
                }
            }
        }

        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    pub fn info(&self, message: String) {
        self.log(LogLevel::Info, message, None);
    }

    pub fn warning(&self, message: String, context: Option<serde_json::Value>) {
        self.log(LogLevel::Warning, message, context);
    }

    pub fn error(&self, message: String, context: Option<serde_json::Value>) {
        self.log(LogLevel::Error, message, context);
    }

    pub fn error_count(&self) -> usize {
        self.counters.lock().map(|c| c.errors).unwrap_or(0)
    }

    pub fn warning_count(&self) -> usize {
        self.counters.lock().map(|c| c.warnings).unwrap_or(0)
    }

    pub fn generate_report(&self, stats: GraphStats) -> Result<DiagnosticReport> {
        self.flush()?;

        let entries = self
            .entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|_| anyhow::anyhow!("Log entries lock poisoned"))?;

        Ok(DiagnosticReport {
            build_id: self.build_id.clone(),
            timestamp: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            summary: ReportSummary {
                errors: self.error_count(),
                warnings: self.warning_count(),
                processed: stats,
            },
            entries,
        })
    }

    pub fn flush(&self) -> Result<()> {
        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                file.flush().context("Failed to flush log file")?;
            }
        }
        Ok(())
    }

    /// Keeps the `max_builds` most recent build logs.
    pub fn rotate_logs(&self, max_builds: usize) -> Result<()> {
        let mut build_files: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();

        for entry in WalkDir::new(&self.log_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let is_build_log = entry
                .file_name()
                .to_str()
                .map_or(false, |name| name.starts_with("build-") && name.ends_with(".jsonl"));
            if !is_build_log {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                if let Ok(modified) = metadata.modified() {
                    build_files.push((entry.path().to_path_buf(), modified.into()));
                }
            }
        }

        if build_files.len() > max_builds {
            build_files.sort_by(|a, b| a.1.cmp(&b.1));

            let to_delete = build_files.len() - max_builds;
            for (path, _) in build_files.iter().take(to_delete) {
                fs::remove_file(path)
                    .with_context(|| format!("Failed to delete old log file: {:?}", path))?;
            }
        }

        Ok(())
    }

    pub fn build_id(&self) -> &str {
        &self.build_id
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(format!("build-{}.jsonl", self.build_id))
    }
}

impl Drop for DiagnosticLogger {
    fn drop(&mut self) {
        if let Ok(mut file_opt) = self.log_file.lock() {
            if let Some(ref mut file) = *file_opt {
                let _ = file.flush();
            }
        }
    }
}
