use crate::config::GraphConfig;
use crate::graph::{BibleGraph, GraphWarning};
use crate::loader::{DatasetLoader, LoadReport};

/// Header, six good records (one repeating a pair, one self-reference) and
/// three records the loader skips.
pub const SAMPLE_DATASET: &str = "\
From Verse\tTo Verse\tVotes\t#www.openbible.info CC-BY 2019-12-19
Gen.1.1\tHeb.11.3\t51
Gen.1.1\tIsa.45.18\t41
Gen.1.1\tJohn.1.1-John.1.3\t187
Gen.1.2\tGen.1.2\t3
Gen.1.1-Gen.2.1\tPs.33.6\t10
Gen.1\tPs.33.6\t10
Heb.11.3\tGen.1.1\t60
Ps.33.6\tGen.1.1
";

pub fn sample_report() -> LoadReport {
    DatasetLoader::new(&GraphConfig::default())
        .unwrap()
        .load(SAMPLE_DATASET.lines())
        .unwrap()
}

pub fn sample_graph() -> (BibleGraph, Vec<GraphWarning>) {
    BibleGraph::from_weights(&sample_report().weights)
}

#[test]
fn test_sample_fixture_shape() {
    let report = sample_report();
    assert_eq!(report.records_read, 8);
    assert_eq!(report.skipped.len(), 3);
    assert_eq!(report.weights.len(), 6);

    let (graph, warnings) = sample_graph();
    assert_eq!(warnings.len(), 1);
    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.edges().len(), 5);
    assert_eq!(graph.books(), vec!["Gen", "Heb", "Isa", "John"]);
}
