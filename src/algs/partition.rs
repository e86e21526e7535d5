//! Contiguous vertex-range ownership and the per-rank edge filter.
//!
//! Rank `r` of `P` owns `[r * ⌊n/P⌋, (r + 1) * ⌊n/P⌋)`; the last rank also
//! takes the `n mod P` leftover vertices. An edge is kept by every rank that
//! owns at least one of its endpoints, so an edge crossing two ranges is held
//! by both of them.

use crate::graph::edge::Edge;
use crate::mst_error::MstError;

/// The vertex range `[first, last)` owned by one rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexPartition {
    pub rank: usize,
    pub size: usize,
    pub first: u32,
    pub last: u32,
}

impl VertexPartition {
    /// Range owned by `rank` out of `size` ranks over `n_verts` vertices.
    pub fn for_rank(n_verts: u32, rank: usize, size: usize) -> Self {
        let size = size.max(1);
        let per_rank = n_verts / size as u32;
        let first = rank as u32 * per_rank;
        let mut last = first + per_rank;
        if rank + 1 == size {
            last += n_verts % size as u32;
        }
        Self {
            rank,
            size,
            first,
            last,
        }
    }

    /// Number of owned vertices.
    #[inline]
    pub fn len(&self) -> u32 {
        self.last - self.first
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.first == self.last
    }

    #[inline]
    pub fn owns(&self, vertex: u32) -> bool {
        (self.first..self.last).contains(&vertex)
    }

    /// `true` if this rank keeps `edge` in its initial collection.
    #[inline]
    pub fn keeps(&self, edge: &Edge) -> bool {
        edge.touches(self.first, self.last)
    }

    /// Collect the edges this rank keeps from a stream of edges.
    pub fn filter_edges<I>(&self, edges: I) -> Result<Vec<Edge>, MstError>
    where
        I: IntoIterator<Item = Result<Edge, MstError>>,
    {
        let mut kept = Vec::new();
        for e in edges {
            let e = e?;
            if self.keeps(&e) {
                kept.push(e);
            }
        }
        log::debug!(
            "rank {} owns vertices {}..{} and keeps {} edges",
            self.rank,
            self.first,
            self.last,
            kept.len()
        );
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_rank_takes_remainder() {
        let parts: Vec<_> = (0..4).map(|r| VertexPartition::for_rank(10, r, 4)).collect();
        let ranges: Vec<_> = parts.iter().map(|p| (p.first, p.last)).collect();
        assert_eq!(ranges, vec![(0, 2), (2, 4), (4, 6), (6, 10)]);
        assert_eq!(parts.iter().map(|p| p.len()).sum::<u32>(), 10);
    }

    #[test]
    fn boundary_edges_are_duplicated() {
        let p0 = VertexPartition::for_rank(4, 0, 2);
        let p1 = VertexPartition::for_rank(4, 1, 2);
        let crossing = Edge::new(1, 2, 7);
        let inner = Edge::new(0, 1, 1);
        assert!(p0.keeps(&crossing) && p1.keeps(&crossing));
        assert!(p0.keeps(&inner) && !p1.keeps(&inner));
    }

    #[test]
    fn filter_propagates_errors() {
        let p = VertexPartition::for_rank(4, 0, 1);
        let items = vec![
            Ok(Edge::new(0, 1, 1)),
            Err(MstError::TruncatedInput { expected: 2, found: 1 }),
        ];
        assert!(p.filter_edges(items).is_err());
    }

    #[test]
    fn single_rank_keeps_everything() {
        let p = VertexPartition::for_rank(5, 0, 1);
        let edges = (0..4).map(|i| Ok(Edge::new(i, i + 1, i)));
        assert_eq!(p.filter_edges(edges).unwrap().len(), 4);
    }
}
