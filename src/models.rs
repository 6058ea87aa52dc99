use crate::config::GraphConfig;
use crate::error::CardinalityError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A single verse: book code, chapter and verse number.
///
/// The derived ordering is only used to give unordered pairs a canonical
/// member order. It does not follow canonical book order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerseId {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

impl VerseId {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        VerseId {
            book: book.into(),
            chapter,
            verse,
        }
    }

    /// OSIS key, `Book.Chapter.Verse`.
    pub fn osis(&self) -> String {
        format!("{}.{}.{}", self.book, self.chapter, self.verse)
    }
}

impl fmt::Display for VerseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.book, self.chapter, self.verse)
    }
}

/// Undirected cross-reference between two verses. Equal regardless of the
/// order the members were given in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersePair {
    low: VerseId,
    high: VerseId,
}

impl VersePair {
    pub fn new(a: VerseId, b: VerseId) -> Self {
        if a <= b {
            VersePair { low: a, high: b }
        } else {
            VersePair { low: b, high: a }
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.low == self.high
    }

    /// The two distinct members of the pair.
    pub fn members(&self) -> Result<(&VerseId, &VerseId), CardinalityError> {
        if self.is_degenerate() {
            return Err(CardinalityError {
                members: vec![self.low.clone()],
            });
        }
        Ok((&self.low, &self.high))
    }
}

impl fmt::Display for VersePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_degenerate() {
            write!(f, "{{{}}}", self.low)
        } else {
            write!(f, "{{{}, {}}}", self.low, self.high)
        }
    }
}

/// Verse pair -> weight, last write wins. Iterates in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct WeightMap {
    entries: Vec<(VersePair, i64)>,
    positions: HashMap<VersePair, usize>,
}

impl WeightMap {
    /// Returns the weight that was replaced, if any.
    pub fn insert(&mut self, pair: VersePair, weight: i64) -> Option<i64> {
        if let Some(&pos) = self.positions.get(&pair) {
            return Some(std::mem::replace(&mut self.entries[pos].1, weight));
        }
        self.positions.insert(pair.clone(), self.entries.len());
        self.entries.push((pair, weight));
        None
    }

    #[cfg(test)]
    pub fn get(&self, pair: &VersePair) -> Option<i64> {
        self.positions.get(pair).map(|&pos| self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = &VersePair> {
        self.entries.iter().map(|(pair, _)| pair)
    }
}

// JSON output structures

/// Counts gathered while loading and building.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GraphSummary {
    pub records_read: usize,
    pub lines_skipped: usize,
    pub weighted_pairs: usize,
    pub graph_warnings: usize,
}

/// Layout/plot hand-off document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct GraphJson {
    pub schema_version: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub node_labels: Vec<String>,
    pub node_groups: Vec<usize>,
    pub books: Vec<String>,
    pub edges: Vec<[usize; 2]>,
    pub summary: GraphSummary,
    pub extensions: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BuildManifest {
    pub schema_version: String,
    pub build_timestamp: String,
    pub source_file: String,
    pub source_sha256: String,
    pub graph_sha256: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub summary: GraphSummary,
    pub config: GraphConfig,
    pub schema_locations: BTreeMap<String, String>,
    pub extensions: serde_json::Value,
}
