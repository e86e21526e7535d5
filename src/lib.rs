//! # kruskal-hypercube
//!
//! kruskal-hypercube computes the minimum spanning tree (or forest) of a large
//! weighted undirected graph across a power-of-two group of ranks.
//!
//! ## Features
//! - Union-find with path compression and union by rank
//! - Chunked parallel edge sort with a pairwise merge tree on a Rayon pool
//! - Kruskal greedy selection over weight-sorted edges
//! - Hypercube reduction: each round halves the active ranks, rank 0 ends
//!   with the global result
//! - Pluggable communication backends (serial, in-process threads, MPI)
//! - Binary graph format reader/writer and a text-to-binary converter
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! kruskal-hypercube = "0.1"
//! # Optional features:
//! # features = ["mpi-support"]
//! ```
//!
//! A single-rank run over an in-memory graph:
//!
//! ```
//! use kruskal_hypercube::prelude::*;
//!
//! let edges = [Edge::new(0, 1, 1), Edge::new(1, 2, 2), Edge::new(0, 2, 5)];
//! let outcome = distributed_mst_from_edges(&NoComm, &MstConfig::default(), 3, &edges)?;
//! assert_eq!(outcome.report().map(|r| r.weight), Some(3));
//! # Ok::<(), MstError>(())
//! ```

pub mod algs;
pub mod config;
pub mod graph;
pub mod io;
pub mod mst_error;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{CommTag, Communicator, NoComm, RayonComm, Wait};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    pub use crate::algs::kruskal::{LocalMst, LocalMstBuilder};
    pub use crate::algs::parallel_sort::ParallelSorter;
    pub use crate::algs::partition::VertexPartition;
    pub use crate::algs::reduction::{
        MstReport, PhaseTimings, RankOutcome, distributed_mst, distributed_mst_from_edges,
    };
    pub use crate::config::MstConfig;
    pub use crate::graph::{DisjointSet, Edge};
    pub use crate::io::{EdgeReader, GraphHeader, read_graph, write_graph};
    pub use crate::mst_error::MstError;
}
