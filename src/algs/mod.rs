//! Re-export public algorithms.

pub mod communicator;
pub mod exchange;
pub mod kruskal;
pub mod parallel_sort;
pub mod partition;
pub mod reduction;
pub mod wire;

pub use kruskal::{LocalMst, LocalMstBuilder};
pub use parallel_sort::ParallelSorter;
pub use partition::VertexPartition;
pub use reduction::{
    MstReport, PhaseTimings, RankOutcome, ReductionCoordinator, distributed_mst,
    distributed_mst_from_edges,
};
