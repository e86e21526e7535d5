//! MstError: Unified error type for kruskal-hypercube public APIs
//!
//! Every fallible step of a run (configuration checks, graph I/O, message
//! passing) reports through this type so the driver can decide how to shut
//! the process group down.

use thiserror::Error;

/// Unified error type for MST operations.
#[derive(Debug, Error)]
pub enum MstError {
    /// The process group must have a power-of-two number of ranks.
    #[error("process count {0} is not a power of two")]
    GroupSizeNotPowerOfTwo(usize),
    /// Each rank must own at least two vertices.
    #[error("{n_verts} vertices over {ranks} ranks leaves fewer than 2 vertices per rank")]
    TooFewVerticesPerRank { n_verts: u32, ranks: usize },
    /// The sort worker pool needs at least one worker.
    #[error("sort worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),
    /// Building the sort worker pool failed.
    #[error("failed to build sort worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    /// Underlying file or stream error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The edge list ended before the count announced in the header.
    #[error("input truncated: header announces {expected} edges, found {found}")]
    TruncatedInput { expected: u32, found: u32 },
    /// An edge endpoint lies outside `[0, n_verts)`.
    #[error("edge ({u}, {v}) references a vertex outside 0..{n_verts}")]
    VertexOutOfRange { u: u32, v: u32, n_verts: u32 },
    /// Malformed text input for the converter.
    #[error("parse error at token {position}: {reason}")]
    Parse { position: usize, reason: String },
    /// A transfer with a peer rank failed or carried a malformed payload.
    #[error("communication error with rank {neighbor}: {source}")]
    CommError {
        neighbor: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Another rank reported a failure during the group status agreement.
    #[error("rank {rank} reported a failure; aborting the run")]
    PeerFailed { rank: usize },
    /// The reduction was started before any input was loaded.
    #[error("no input loaded on this rank")]
    NotLoaded,
    /// The message-passing runtime could not be initialised.
    #[error("communicator initialisation failed: {0}")]
    CommInit(String),
}
