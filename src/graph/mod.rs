//! Graph primitives shared by every stage: edges and the union-find forest.

pub mod disjoint_set;
pub mod edge;

pub use disjoint_set::DisjointSet;
pub use edge::Edge;
