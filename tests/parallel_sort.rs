mod util;

use kruskal_hypercube::graph::edge::is_sorted_by_weight;
use kruskal_hypercube::prelude::*;
use proptest::prelude::*;

fn arb_edges(max_len: usize) -> impl Strategy<Value = Vec<Edge>> {
    prop::collection::vec((0u32..1000, 0u32..1000, 0u32..50), 0..max_len)
        .prop_map(|v| v.into_iter().map(Edge::from).collect())
}

fn assert_permutation(got: &[Edge], want: &[Edge]) {
    let key = |e: &Edge| (e.weight, e.u, e.v);
    let mut a = got.to_vec();
    a.sort_unstable_by_key(key);
    let mut b = want.to_vec();
    b.sort_unstable_by_key(key);
    assert_eq!(a, b, "not a permutation");
}

#[test]
fn workers_equal_to_len() {
    let edges = util::connected_graph(9, 0, 100, 1);
    let sorter = ParallelSorter::new(edges.len()).unwrap();
    let mut sorted = edges.clone();
    let mut scratch = Vec::new();
    sorter.sort_vec(&mut sorted, &mut scratch);
    assert!(is_sorted_by_weight(&sorted));
    assert_permutation(&sorted, &edges);
}

#[test]
fn more_workers_than_edges() {
    let edges = vec![Edge::new(0, 1, 3), Edge::new(1, 2, 1)];
    let sorter = ParallelSorter::new(8).unwrap();
    let mut sorted = edges.clone();
    sorter.sort_vec(&mut sorted, &mut Vec::new());
    assert_eq!(sorted, vec![Edge::new(1, 2, 1), Edge::new(0, 1, 3)]);
}

#[test]
fn zero_workers_is_rejected() {
    assert!(matches!(
        ParallelSorter::new(0),
        Err(MstError::InvalidWorkerCount(0))
    ));
}

proptest! {
    #[test]
    fn sorted_permutation_for_any_pool(edges in arb_edges(300), workers in 1usize..9) {
        let sorter = ParallelSorter::new(workers).unwrap();
        let mut sorted = edges.clone();
        let mut scratch = Vec::new();
        sorter.sort_vec(&mut sorted, &mut scratch);
        prop_assert!(is_sorted_by_weight(&sorted));
        assert_permutation(&sorted, &edges);
    }
}
