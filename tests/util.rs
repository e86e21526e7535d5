#![allow(dead_code)]
use kruskal_hypercube::prelude::*;
use rand::{Rng, SeedableRng, rngs::SmallRng, seq::SliceRandom};

/// Random connected graph: a shuffled spanning path plus `extra` random edges,
/// all in random order.
pub fn connected_graph(n_verts: u32, extra: usize, max_weight: u32, seed: u64) -> Vec<Edge> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut order: Vec<u32> = (0..n_verts).collect();
    order.shuffle(&mut rng);
    let mut edges: Vec<Edge> = order
        .windows(2)
        .map(|w| Edge::new(w[0], w[1], rng.gen_range(0..=max_weight)))
        .collect();
    for _ in 0..extra {
        let u = rng.gen_range(0..n_verts);
        let v = rng.gen_range(0..n_verts);
        edges.push(Edge::new(u, v, rng.gen_range(0..=max_weight)));
    }
    edges.shuffle(&mut rng);
    edges
}

/// Plain sequential Kruskal used as the oracle.
pub fn serial_weight(n_verts: u32, edges: &[Edge]) -> u64 {
    let mut sorted = edges.to_vec();
    sorted.sort_by_key(|e| e.weight);
    let mut set = DisjointSet::new(n_verts);
    let mut total = 0u64;
    for e in sorted {
        if !set.same_set(e.u, e.v) {
            set.union(e.u, e.v);
            total += u64::from(e.weight);
        }
    }
    total
}

/// Run every rank of a fresh in-process group on its own thread.
pub fn run_group(
    size: usize,
    config: &MstConfig,
    n_verts: u32,
    edges: &[Edge],
) -> Vec<Result<RankOutcome, MstError>> {
    std::thread::scope(|s| {
        let handles: Vec<_> = RayonComm::group(size)
            .into_iter()
            .map(|comm| {
                s.spawn(move || distributed_mst_from_edges(&comm, config, n_verts, edges))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("rank thread panicked"))
            .collect()
    })
}

/// Rank 0's report out of a group run; every other rank must have retired.
pub fn root_report(results: Vec<Result<RankOutcome, MstError>>) -> MstReport {
    let mut report = None;
    for (rank, result) in results.into_iter().enumerate() {
        match result.unwrap_or_else(|e| panic!("rank {rank} failed: {e}")) {
            RankOutcome::Root(r) => {
                assert_eq!(rank, 0, "only rank 0 may hold the result");
                report = Some(r);
            }
            RankOutcome::Retired { to, .. } => assert!(to < rank),
        }
    }
    report.expect("rank 0 produced no report")
}

/// `forest` is acyclic, uses only input edges and has `n_verts - components` edges.
pub fn assert_spanning_forest(n_verts: u32, input: &[Edge], forest: &[Edge], components: usize) {
    let mut set = DisjointSet::new(n_verts);
    for e in forest {
        assert!(input.contains(e), "{e} is not an input edge");
        assert!(!set.same_set(e.u, e.v), "{e} closes a cycle");
        set.union(e.u, e.v);
    }
    assert_eq!(forest.len(), n_verts as usize - components);
}

/// Encode a graph in the binary input format.
pub fn encode_graph(n_verts: u32, edges: &[Edge]) -> Vec<u8> {
    let mut out = Vec::new();
    write_graph(&mut out, n_verts, edges).expect("in-memory write");
    out
}
