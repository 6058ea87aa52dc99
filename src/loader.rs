use crate::config::GraphConfig;
use crate::error::ReferenceError;
use crate::models::{VersePair, WeightMap};
use crate::reference::ReferenceParser;
use anyhow::{Context, Result};
use regex::Regex;
use serde_json::json;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FieldCount(usize),
    Weight(String),
    Reference(ReferenceError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FieldCount(n) => write!(f, "expected 3 fields, found {}", n),
            SkipReason::Weight(raw) => write!(f, "weight '{}' is not an integer", raw),
            SkipReason::Reference(e) => write!(f, "{}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based, counting the header.
    pub line_number: usize,
    pub line: String,
    pub reason: SkipReason,
}

impl SkippedLine {
    pub fn context(&self) -> serde_json::Value {
        json!({
            "line": self.line_number,
            "text": self.line,
            "reason": self.reason.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub weights: WeightMap,
    pub skipped: Vec<SkippedLine>,
    pub records_read: usize,
}

/// Reads `<from-ref> <to-ref> <weight>` records into a [`WeightMap`].
pub struct DatasetLoader {
    parser: ReferenceParser,
    field_pattern: Regex,
    strict_references: bool,
}

impl DatasetLoader {
    pub fn new(config: &GraphConfig) -> Result<Self> {
        Ok(DatasetLoader {
            parser: ReferenceParser::new(),
            field_pattern: Regex::new(r"\s+").context("Failed to compile field pattern")?,
            strict_references: config.strict_references,
        })
    }

    pub fn load_file(&self, path: &Path) -> Result<LoadReport> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset: {:?}", path))?;
        self.load(content.lines())
            .with_context(|| format!("Failed to load dataset: {:?}", path))
    }

    /// The first line is a header and is never inspected. Bad records are
    /// skipped and reported, except malformed references in strict mode.
    pub fn load<I, S>(&self, lines: I) -> Result<LoadReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = LoadReport::default();

        for (idx, line) in lines.into_iter().enumerate().skip(1) {
            let line = line.as_ref();
            let line_number = idx + 1;
            report.records_read += 1;

            let skip = |reason: SkipReason| SkippedLine {
                line_number,
                line: line.to_string(),
                reason,
            };

            let trimmed = line.trim();
            let fields: Vec<&str> = if trimmed.is_empty() {
                Vec::new()
            } else {
                self.field_pattern.split(trimmed).collect()
            };

            if fields.len() != 3 {
                report.skipped.push(skip(SkipReason::FieldCount(fields.len())));
                continue;
            }

            // Both tokens are parsed so strict mode sees a malformed target even
            // when the source is already an invalid range.
            let (from_verses, to_verses) =
                match (self.parser.parse(fields[0]), self.parser.parse(fields[1])) {
                    (Ok(from), Ok(to)) => (from, to),
                    (from, to) => {
                        let errors: Vec<ReferenceError> =
                            [from.err(), to.err()].into_iter().flatten().collect();
                        if self.strict_references {
                            if let Some(e) = errors.iter().find(|e| e.is_malformed()) {
                                return Err(anyhow::Error::new(e.clone()).context(format!(
                                    "Malformed reference on line {}",
                                    line_number
                                )));
                            }
                        }
                        if let Some(e) = errors.into_iter().next() {
                            report.skipped.push(skip(SkipReason::Reference(e)));
                        }
                        continue;
                    }
                };

            let weight = match fields[2].parse::<i64>() {
                Ok(w) => w,
                Err(_) => {
                    report.skipped.push(skip(SkipReason::Weight(fields[2].to_string())));
                    continue;
                }
            };

            for from_verse in &from_verses {
                for to_verse in &to_verses {
                    report
                        .weights
                        .insert(VersePair::new(from_verse.clone(), to_verse.clone()), weight);
                }
            }
        }

        Ok(report)
    }
}
