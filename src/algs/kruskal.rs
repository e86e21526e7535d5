//! Greedy (Kruskal) edge selection over a weight-sorted edge list.
//!
//! One pass: an edge is kept iff its endpoints still sit in different
//! components, after which the two components are merged. The kept edges form
//! a minimum spanning forest of the graph induced by the input. A
//! disconnected input is not an error; the forest simply has fewer edges.

use crate::graph::disjoint_set::DisjointSet;
use crate::graph::edge::{Edge, total_weight};
use crate::mst_error::MstError;

/// Edges selected by one greedy pass, plus their total weight.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalMst {
    pub edges: Vec<Edge>,
    pub weight: u64,
}

impl LocalMst {
    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Runs the greedy pass against a fresh union-find sized to `n_verts`.
#[derive(Clone, Copy, Debug)]
pub struct LocalMstBuilder {
    n_verts: u32,
}

impl LocalMstBuilder {
    pub fn new(n_verts: u32) -> Self {
        Self { n_verts }
    }

    /// Select a minimum spanning forest from `sorted` (ascending by weight).
    ///
    /// A new [`DisjointSet`] is made for every call; no union history is
    /// carried between calls.
    pub fn build(&self, sorted: &[Edge]) -> Result<LocalMst, MstError> {
        if let Some(bad) = sorted
            .iter()
            .find(|e| e.u >= self.n_verts || e.v >= self.n_verts)
        {
            return Err(MstError::VertexOutOfRange {
                u: bad.u,
                v: bad.v,
                n_verts: self.n_verts,
            });
        }
        let mut set = DisjointSet::new(self.n_verts);
        Ok(select_forest(sorted, &mut set))
    }
}

/// The greedy pass proper, over a caller-supplied union-find.
///
/// # Panics
/// Panics if an endpoint lies outside `set`.
pub fn select_forest(sorted: &[Edge], set: &mut DisjointSet) -> LocalMst {
    debug_assert!(crate::graph::edge::is_sorted_by_weight(sorted));
    let mut out = LocalMst {
        edges: Vec::with_capacity(sorted.len().min(set.len().saturating_sub(1))),
        weight: 0,
    };
    for e in sorted {
        let ru = set.find(e.u);
        let rv = set.find(e.v);
        if ru != rv {
            out.edges.push(*e);
            set.union(ru, rv);
        }
    }
    out.weight = total_weight(&out.edges);
    out
}
