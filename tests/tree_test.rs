//! Tests for tree queries: lookup, depth, height, LCA and distance

use itertools::Itertools;
use rstest::{fixture, rstest};

use phylotree::domain::{DomainError, PhyloTree, Species};
use phylotree::util::testing;

#[fixture]
fn hamming_trio() -> Vec<Species> {
    testing::init_test_setup();
    vec![
        Species::new("A", "AAAA"),
        Species::new("B", "AAAT"),
        Species::new("C", "TTTT"),
    ]
}

#[fixture]
fn primates() -> Vec<Species> {
    testing::init_test_setup();
    vec![
        Species::new("human", "ACGTACGTAC"),
        Species::new("chimp", "ACGTACGTAA"),
        Species::new("gorilla", "ACGTACTTAA"),
        Species::new("orangutan", "ACGAACTTCA"),
        Species::new("gibbon", "TCGAACTTCG"),
        Species::new("macaque", "TGGATCTTCG"),
    ]
}

// ============================================================
// Label lookup
// ============================================================

#[rstest]
fn given_existing_labels_when_finding_then_returns_matching_node(hamming_trio: Vec<Species>) {
    let tree = PhyloTree::build(&hamming_trio).unwrap();

    for label in ["A", "B", "C", "AB", "ABC"] {
        let idx = tree.find_by_label(label).expect(label);
        assert_eq!(tree.label(idx), Some(label));
    }
    assert_eq!(tree.find_by_label("ABC"), Some(tree.root()));
}

#[rstest]
fn given_unknown_label_when_finding_then_returns_none(hamming_trio: Vec<Species>) {
    let tree = PhyloTree::build(&hamming_trio).unwrap();

    assert_eq!(tree.find_by_label("Z"), None);
    assert_eq!(tree.find_by_label("BA"), None);
    assert_eq!(tree.find_by_label(""), None);
}

// ============================================================
// Depth and height
// ============================================================

#[rstest]
#[case("ABC", 0, 0.0)]
#[case("AB", 1, 1.75)]
#[case("C", 1, 1.75)]
#[case("A", 2, 2.25)]
#[case("B", 2, 2.25)]
fn given_node_when_computing_depth_then_counts_edges_from_root(
    hamming_trio: Vec<Species>,
    #[case] label: &str,
    #[case] depth: usize,
    #[case] weighted_depth: f64,
) {
    let tree = PhyloTree::build(&hamming_trio).unwrap();
    let idx = tree.find_by_label(label);

    assert_eq!(tree.node_depth(idx), Some(depth));
    assert_eq!(tree.weighted_node_depth(idx), Some(weighted_depth));
}

#[rstest]
#[case("ABC", 2, 2.25)]
#[case("AB", 1, 0.5)]
#[case("A", 0, 0.0)]
#[case("C", 0, 0.0)]
fn given_node_when_computing_height_then_measures_down_to_deepest_leaf(
    hamming_trio: Vec<Species>,
    #[case] label: &str,
    #[case] height: usize,
    #[case] weighted_height: f64,
) {
    let tree = PhyloTree::build(&hamming_trio).unwrap();
    let idx = tree.find_by_label(label);

    assert_eq!(tree.node_height(idx), Some(height));
    assert_eq!(tree.weighted_node_height(idx), Some(weighted_height));
}

#[rstest]
fn given_missing_node_when_computing_depth_or_height_then_below_all_valid_values(hamming_trio: Vec<Species>) {
    let tree = PhyloTree::build(&hamming_trio).unwrap();
    let missing = tree.find_by_label("Z");

    assert_eq!(tree.node_depth(missing), None);
    assert_eq!(tree.node_height(missing), None);
    assert_eq!(tree.weighted_node_depth(missing), None);
    assert_eq!(tree.weighted_node_height(missing), None);
    assert!(tree.node_depth(missing) < Some(0));
    assert!(tree.node_height(missing) < Some(0));
}

#[rstest]
fn given_tree_when_computing_overall_heights_then_match_root(hamming_trio: Vec<Species>) {
    let tree = PhyloTree::build(&hamming_trio).unwrap();

    assert_eq!(tree.height(), 2);
    assert_eq!(tree.weighted_height(), 2.25);
    assert!(tree.weighted_height() >= 0.0);
}

#[rstest]
fn given_any_tree_when_checking_leaves_then_height_is_zero(primates: Vec<Species>) {
    let tree = PhyloTree::build(&primates).unwrap();

    for (idx, _) in tree.iter().filter(|(_, node)| node.is_leaf()) {
        assert_eq!(tree.node_height(Some(idx)), Some(0));
        assert_eq!(tree.weighted_node_height(Some(idx)), Some(0.0));
    }
}

// ============================================================
// Least common ancestor
// ============================================================

#[rstest]
#[case("A", "B", "AB")]
#[case("B", "A", "AB")]
#[case("A", "C", "ABC")]
#[case("C", "B", "ABC")]
#[case("A", "AB", "AB")]
#[case("ABC", "A", "ABC")]
fn given_two_labels_when_finding_lca_then_returns_deepest_shared_ancestor(
    hamming_trio: Vec<Species>,
    #[case] a: &str,
    #[case] b: &str,
    #[case] expected: &str,
) {
    let tree = PhyloTree::build(&hamming_trio).unwrap();
    let lca = tree.lca(a, b).unwrap();
    assert_eq!(tree.label(lca), Some(expected));
}

#[rstest]
fn given_same_label_when_finding_lca_then_returns_that_node(primates: Vec<Species>) {
    let tree = PhyloTree::build(&primates).unwrap();

    for (_, node) in tree.iter() {
        assert_eq!(tree.lca(&node.label, &node.label), tree.find_by_label(&node.label));
    }
}

#[rstest]
fn given_unknown_label_when_finding_lca_then_returns_none(hamming_trio: Vec<Species>) {
    let tree = PhyloTree::build(&hamming_trio).unwrap();

    assert_eq!(tree.lca("A", "Z"), None);
    assert_eq!(tree.lca("Z", "A"), None);
}

// ============================================================
// Evolutionary distance
// ============================================================

#[rstest]
#[case("A", "B", 1.0)]
#[case("A", "C", 4.0)]
#[case("B", "C", 4.0)]
#[case("AB", "C", 3.5)]
#[case("A", "AB", 0.5)]
#[case("C", "C", 0.0)]
fn given_two_labels_when_computing_distance_then_sums_path_to_lca(
    hamming_trio: Vec<Species>,
    #[case] a: &str,
    #[case] b: &str,
    #[case] expected: f64,
) {
    let tree = PhyloTree::build(&hamming_trio).unwrap();
    assert_eq!(tree.distance(a, b), Ok(expected));
}

#[rstest]
fn given_unknown_label_when_computing_distance_then_returns_label_not_found(hamming_trio: Vec<Species>) {
    let tree = PhyloTree::build(&hamming_trio).unwrap();

    assert_eq!(
        tree.distance("A", "Z"),
        Err(DomainError::LabelNotFound("Z".to_string()))
    );
    assert_eq!(
        tree.distance("Y", "A"),
        Err(DomainError::LabelNotFound("Y".to_string()))
    );
}

#[rstest]
fn given_all_label_pairs_when_computing_distance_then_symmetric(primates: Vec<Species>) {
    let tree = PhyloTree::build(&primates).unwrap();
    let labels: Vec<String> = tree.iter().map(|(_, node)| node.label.clone()).collect();

    for (x, y) in labels.iter().tuple_combinations() {
        let xy = tree.distance(x, y).unwrap();
        let yx = tree.distance(y, x).unwrap();
        assert_eq!(xy, yx, "distance({}, {}) not symmetric", x, y);
        assert!(xy >= 0.0);
    }
    for x in &labels {
        assert_eq!(tree.distance(x, x), Ok(0.0));
    }
}

#[test]
fn given_single_species_when_querying_then_everything_is_zero() {
    let species = vec![Species::new("X", "ACGT")];
    let tree = PhyloTree::build(&species).unwrap();

    assert_eq!(tree.height(), 0);
    assert_eq!(tree.weighted_height(), 0.0);
    assert_eq!(tree.distance("X", "X"), Ok(0.0));
    assert_eq!(tree.lca("X", "X"), Some(tree.root()));
    assert_eq!(tree.node_depth(Some(tree.root())), Some(0));
}

// ============================================================
// Traversal helpers
// ============================================================

#[rstest]
fn given_leaf_when_walking_ancestors_then_nearest_first(hamming_trio: Vec<Species>) {
    let tree = PhyloTree::build(&hamming_trio).unwrap();
    let a = tree.find_by_label("A").unwrap();

    let labels: Vec<&str> = tree.ancestors(a).map(|(_, node)| node.label.as_str()).collect();
    assert_eq!(labels, vec!["AB", "ABC"]);
    assert_eq!(tree.ancestors(tree.root()).count(), 0);
}

#[rstest]
fn given_tree_when_traversing_then_orders_are_pre_and_post(hamming_trio: Vec<Species>) {
    let tree = PhyloTree::build(&hamming_trio).unwrap();

    let pre: Vec<&str> = tree.iter().map(|(_, node)| node.label.as_str()).collect();
    let post: Vec<&str> = tree
        .iter_postorder()
        .map(|(_, node)| node.label.as_str())
        .collect();

    assert_eq!(pre, vec!["ABC", "AB", "A", "B", "C"]);
    assert_eq!(post, vec!["A", "B", "AB", "C", "ABC"]);
    assert_eq!(tree.leaf_labels(), vec!["A", "B", "C"]);
}

#[rstest]
fn given_internal_node_when_collecting_descendants_then_returns_its_species(hamming_trio: Vec<Species>) {
    let tree = PhyloTree::build(&hamming_trio).unwrap();

    let ab = tree.find_by_label("AB").unwrap();
    let names: Vec<&str> = tree
        .descendant_species(ab)
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(tree.descendant_species(tree.root()).len(), 3);
}
