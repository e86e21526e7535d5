//! Run configuration and process-topology checks.

use crate::mst_error::MstError;
use serde::{Deserialize, Serialize};

/// Default size of the per-rank sort worker pool.
pub const DEFAULT_SORT_WORKERS: usize = 2;

/// Default base tag for round transfers; each round uses two tags above it.
pub const DEFAULT_TAG_BASE: u16 = 0x4D00;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MstConfig {
    /// Threads used by the chunked sort and its merge tree.
    pub sort_workers: usize,
    /// Print per-phase timings on every rank.
    pub verbose: bool,
    /// First message tag used by the reduction rounds.
    pub tag_base: u16,
}

impl Default for MstConfig {
    fn default() -> Self {
        Self {
            sort_workers: DEFAULT_SORT_WORKERS,
            verbose: false,
            tag_base: DEFAULT_TAG_BASE,
        }
    }
}

impl MstConfig {
    pub fn with_sort_workers(mut self, workers: usize) -> Self {
        self.sort_workers = workers;
        self
    }

    pub fn validate(&self) -> Result<(), MstError> {
        if self.sort_workers == 0 {
            return Err(MstError::InvalidWorkerCount(self.sort_workers));
        }
        Ok(())
    }
}

/// Reject process groups whose size is not a power of two.
///
/// A single rank is accepted and runs the serial path.
pub fn validate_group_size(size: usize) -> Result<(), MstError> {
    if size == 0 || !size.is_power_of_two() {
        return Err(MstError::GroupSizeNotPowerOfTwo(size));
    }
    Ok(())
}

/// Every rank must own at least two vertices.
pub fn validate_vertices_per_rank(n_verts: u32, size: usize) -> Result<(), MstError> {
    if (n_verts as usize) / size.max(1) < 2 {
        return Err(MstError::TooFewVerticesPerRank {
            n_verts,
            ranks: size,
        });
    }
    Ok(())
}
