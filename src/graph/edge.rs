//! `Edge`: an undirected, weighted `(u, v, weight)` triple
//!
//! Edges are the only data that moves through the whole pipeline: they are
//! read from the binary input, filtered by vertex ownership, sorted by the
//! worker pool, selected by the greedy pass and shipped between ranks.
//!
//! This module provides:
//! - A `repr(C)` `Edge` of three `u32` fields, `Pod` so that whole slices can
//!   be reinterpreted as bytes for file I/O.
//! - Weight-only ordering helpers. `(u, v)` and `(v, u)` name the same edge;
//!   ties between equal weights are deliberately left unordered.

use bytemuck::{Pod, Zeroable};
use std::cmp::Ordering;
use std::fmt;

/// One undirected weighted edge.
///
/// # Memory layout
/// Exactly 12 bytes with no padding, the same layout as one record of the
/// binary graph format, so records can be cast with `bytemuck`.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Edge {
    pub u: u32,
    pub v: u32,
    pub weight: u32,
}

static_assertions::assert_eq_size!(Edge, [u8; 12]);

impl Edge {
    /// Size of one edge record in bytes.
    pub const SIZE: usize = std::mem::size_of::<Edge>();

    #[inline]
    pub const fn new(u: u32, v: u32, weight: u32) -> Self {
        Self { u, v, weight }
    }

    /// Endpoints with the smaller id first.
    ///
    /// Two edges that differ only in endpoint order share the same key.
    #[inline]
    pub fn endpoints(&self) -> (u32, u32) {
        if self.u <= self.v {
            (self.u, self.v)
        } else {
            (self.v, self.u)
        }
    }

    /// `true` if either endpoint lies in `[first, last)`.
    #[inline]
    pub fn touches(&self, first: u32, last: u32) -> bool {
        (first..last).contains(&self.u) || (first..last).contains(&self.v)
    }

    /// Compare by weight only.
    #[inline]
    pub fn cmp_weight(&self, other: &Edge) -> Ordering {
        self.weight.cmp(&other.weight)
    }
}

// -----------------------------------------------------------------------------
// Formatting traits
// -----------------------------------------------------------------------------

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({}-{}, w={})", self.u, self.v, self.weight)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.u, self.v, self.weight)
    }
}

impl From<(u32, u32, u32)> for Edge {
    #[inline]
    fn from((u, v, weight): (u32, u32, u32)) -> Self {
        Edge::new(u, v, weight)
    }
}

/// Sum of weights, widened so large graphs cannot overflow.
pub fn total_weight(edges: &[Edge]) -> u64 {
    edges.iter().map(|e| u64::from(e.weight)).sum()
}

/// `true` if `edges` is non-decreasing by weight.
pub fn is_sorted_by_weight(edges: &[Edge]) -> bool {
    edges.windows(2).all(|w| w[0].weight <= w[1].weight)
}
