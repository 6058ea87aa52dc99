use crate::error::CardinalityError;
use crate::models::{VerseId, VersePair, WeightMap};
use std::collections::HashMap;

/// Dense verse ids, assigned in first-encounter order.
///
/// Both directions live behind one insertion API so that
/// `verse(index_of(v)) == v` always holds.
#[derive(Debug, Clone, Default)]
pub struct VerseIndex {
    verse_to_index: HashMap<VerseId, usize>,
    index_to_verse: Vec<VerseId>,
}

impl VerseIndex {
    /// Existing id for `verse`, or the next free one.
    pub fn index_of(&mut self, verse: &VerseId) -> usize {
        if let Some(&index) = self.verse_to_index.get(verse) {
            return index;
        }
        let index = self.index_to_verse.len();
        self.verse_to_index.insert(verse.clone(), index);
        self.index_to_verse.push(verse.clone());
        index
    }

    #[cfg(test)]
    pub fn get(&self, verse: &VerseId) -> Option<usize> {
        self.verse_to_index.get(verse).copied()
    }

    pub fn verse(&self, index: usize) -> Option<&VerseId> {
        self.index_to_verse.get(index)
    }

    pub fn len(&self) -> usize {
        self.index_to_verse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_verse.is_empty()
    }

    pub fn verses(&self) -> &[VerseId] {
        &self.index_to_verse
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphWarning {
    pub pair: String,
    pub error: CardinalityError,
}

/// Verses as nodes, cross-references as undirected edges between dense ids.
#[derive(Debug, Clone, Default)]
pub struct BibleGraph {
    index: VerseIndex,
    edges: Vec<(usize, usize)>,
}

impl BibleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// One edge per weighted pair, in weight-map order. Degenerate pairs are
    /// skipped and returned as warnings. Weights are not kept on the edges.
    pub fn from_weights(weights: &WeightMap) -> (Self, Vec<GraphWarning>) {
        let mut graph = BibleGraph::new();
        let mut warnings = Vec::new();

        for pair in weights.pairs() {
            match pair.members() {
                Ok((from, to)) => graph.add_edge(from, to),
                Err(error) => warnings.push(Self::warning(pair, error)),
            }
        }

        (graph, warnings)
    }

    fn warning(pair: &VersePair, error: CardinalityError) -> GraphWarning {
        GraphWarning {
            pair: pair.to_string(),
            error,
        }
    }

    /// Appends an edge. Repeated calls append repeated edges.
    pub fn add_edge(&mut self, from: &VerseId, to: &VerseId) {
        let from = self.index_of(from);
        let to = self.index_of(to);
        self.edges.push((from, to));
    }

    pub fn index_of(&mut self, verse: &VerseId) -> usize {
        self.index.index_of(verse)
    }

    #[cfg(test)]
    pub fn lookup(&self, verse: &VerseId) -> Option<usize> {
        self.index.get(verse)
    }

    pub fn verse(&self, index: usize) -> Option<&VerseId> {
        self.index.verse(index)
    }

    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn verses(&self) -> &[VerseId] {
        self.index.verses()
    }

    /// OSIS keys in id order.
    pub fn node_labels(&self) -> Vec<String> {
        self.verses().iter().map(VerseId::osis).collect()
    }

    /// Distinct book codes in the order their first verse got an id.
    pub fn books(&self) -> Vec<String> {
        let mut books: Vec<String> = Vec::new();
        for verse in self.verses() {
            if !books.iter().any(|b| b == &verse.book) {
                books.push(verse.book.clone());
            }
        }
        books
    }

    /// Per node, the position of its book in [`BibleGraph::books`].
    pub fn node_groups(&self) -> Vec<usize> {
        let mut groups: HashMap<&str, usize> = HashMap::new();
        self.verses()
            .iter()
            .map(|verse| {
                let next = groups.len();
                *groups.entry(verse.book.as_str()).or_insert(next)
            })
            .collect()
    }

    /// Edge endpoints per node; a repeated edge counts each time.
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.node_count()];
        for &(from, to) in &self.edges {
            degrees[from] += 1;
            degrees[to] += 1;
        }
        degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(book: &str, chapter: u32, verse: u32) -> VerseId {
        VerseId::new(book, chapter, verse)
    }

    #[test]
    fn test_add_edge_twice_repeats_edge_not_ids() {
        let mut graph = BibleGraph::new();
        let a = v("Gen", 1, 1);
        let b = v("John", 1, 1);

        graph.add_edge(&a, &b);
        graph.add_edge(&a, &b);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edges(), &[(0, 1), (0, 1)]);
    }

    #[test]
    fn test_ids_follow_first_encounter() {
        let mut graph = BibleGraph::new();
        graph.add_edge(&v("Gen", 1, 1), &v("Gen", 1, 2));
        graph.add_edge(&v("Gen", 1, 3), &v("Gen", 1, 1));

        assert_eq!(graph.lookup(&v("Gen", 1, 1)), Some(0));
        assert_eq!(graph.lookup(&v("Gen", 1, 2)), Some(1));
        assert_eq!(graph.lookup(&v("Gen", 1, 3)), Some(2));
        assert_eq!(graph.lookup(&v("Gen", 1, 4)), None);
        assert_eq!(graph.edges(), &[(0, 1), (2, 0)]);
        assert_eq!(graph.node_labels(), vec!["Gen.1.1", "Gen.1.2", "Gen.1.3"]);
    }

    #[test]
    fn test_index_of_allocates_once() {
        let mut graph = BibleGraph::new();
        assert_eq!(graph.index_of(&v("Rev", 22, 21)), 0);
        assert_eq!(graph.index_of(&v("Rev", 22, 21)), 0);
        assert_eq!(graph.index_of(&v("Rev", 22, 20)), 1);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_from_weights_skips_degenerate_pairs() {
        let mut weights = WeightMap::default();
        weights.insert(VersePair::new(v("Gen", 1, 1), v("Gen", 1, 1)), 5);
        weights.insert(VersePair::new(v("Gen", 1, 1), v("Heb", 11, 3)), 8);

        let (graph, warnings) = BibleGraph::from_weights(&weights);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].pair, "{Gen.1.1}");
        assert_eq!(warnings[0].error.members, vec![v("Gen", 1, 1)]);
    }

    #[test]
    fn test_books_and_groups() {
        let mut graph = BibleGraph::new();
        graph.add_edge(&v("John", 1, 1), &v("Gen", 1, 1));
        graph.add_edge(&v("John", 1, 3), &v("Col", 1, 16));

        assert_eq!(graph.books(), vec!["John", "Gen", "Col"]);
        assert_eq!(graph.node_groups(), vec![0, 1, 0, 2]);
        assert_eq!(graph.degrees(), vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_empty_graph() {
        let (graph, warnings) = BibleGraph::from_weights(&WeightMap::default());
        assert!(graph.is_empty());
        assert!(graph.books().is_empty());
        assert!(warnings.is_empty());
    }

    proptest! {
        #[test]
        fn prop_index_is_a_bijection(
            edges in proptest::collection::vec(((0u32..5, 1u32..20), (0u32..5, 1u32..20)), 0..60)
        ) {
            let books = ["Gen", "Exod", "Ps", "Isa", "John"];
            let mut graph = BibleGraph::new();
            for ((b1, v1), (b2, v2)) in &edges {
                graph.add_edge(
                    &VerseId::new(books[*b1 as usize], 1, *v1),
                    &VerseId::new(books[*b2 as usize], 1, *v2),
                );
            }

            prop_assert_eq!(graph.edges().len(), edges.len());
            for index in 0..graph.node_count() {
                let verse = graph.verse(index).unwrap().clone();
                prop_assert_eq!(graph.lookup(&verse), Some(index));
            }
            prop_assert!(graph
                .edges()
                .iter()
                .all(|&(a, b)| a < graph.node_count() && b < graph.node_count()));
            prop_assert_eq!(graph.node_groups().len(), graph.node_count());
        }
    }
}
