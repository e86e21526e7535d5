//! Rank-to-rank transfers used by the reduction rounds.
//!
//! An edge list travels as two messages: a [`WireCount`] header on `tag`,
//! then the [`WireEdge`] payload on `tag + 1`. The receiver learns the edge
//! count from the header, so no bound has to be agreed in advance.
//!
//! Sends are always posted before receives. MPI sends here are blocking;
//! the messages exchanged in both directions at once (status words) are
//! small enough to complete eagerly.

use crate::algs::communicator::{CommTag, Communicator, Wait};
use crate::algs::wire::{
    WireCount, WireEdge, WireStatus, WIRE_VERSION, cast_slice, cast_slice_mut, decode_records,
    expect_exact_len,
};
use crate::graph::edge::Edge;
use crate::mst_error::MstError;
use std::mem::size_of;

fn comm_err(neighbor: usize, msg: impl Into<String>) -> MstError {
    MstError::CommError {
        neighbor,
        source: msg.into().into(),
    }
}

/// Receive one fixed-size record from `peer` on `tag`.
fn recv_record<C, T>(comm: &C, peer: usize, tag: CommTag) -> Result<T, MstError>
where
    C: Communicator,
    T: bytemuck::Pod,
{
    let mut slot = <T as bytemuck::Zeroable>::zeroed();
    let raw = comm
        .irecv(peer, tag.as_u16(), cast_slice_mut(std::slice::from_mut(&mut slot)))
        .wait()
        .ok_or_else(|| comm_err(peer, format!("no message on tag {:#06x}", tag.as_u16())))?;
    expect_exact_len(raw.len(), size_of::<T>()).map_err(|e| comm_err(peer, e))?;
    Ok(bytemuck::pod_read_unaligned(&raw))
}

/// Send `edges` to `peer`: count header, then payload.
pub fn send_edges<C: Communicator>(comm: &C, peer: usize, tag: CommTag, edges: &[Edge]) {
    let header = WireCount::new(edges.len());
    let payload: Vec<WireEdge> = edges.iter().map(WireEdge::of).collect();
    let h = comm.isend(peer, tag.as_u16(), cast_slice(std::slice::from_ref(&header)));
    let p = comm.isend(peer, tag.offset(1).as_u16(), cast_slice(&payload));
    let _ = h.wait();
    let _ = p.wait();
    log::debug!(
        "rank {} -> rank {}: {} edges on tag {:#06x}",
        comm.rank(),
        peer,
        edges.len(),
        tag.as_u16()
    );
}

/// Block until `peer`'s edge list arrives and decode it.
pub fn recv_edges<C: Communicator>(
    comm: &C,
    peer: usize,
    tag: CommTag,
) -> Result<Vec<Edge>, MstError> {
    let header: WireCount = recv_record(comm, peer, tag)?;
    if header.version() != WIRE_VERSION {
        return Err(comm_err(
            peer,
            format!(
                "wire version {} does not match local version {WIRE_VERSION}",
                header.version()
            ),
        ));
    }
    let n = header.get();
    let mut buf = vec![0u8; n * size_of::<WireEdge>()];
    let raw = comm
        .irecv(peer, tag.offset(1).as_u16(), &mut buf)
        .wait()
        .ok_or_else(|| comm_err(peer, format!("missing payload of {n} edges")))?;
    expect_exact_len(raw.len(), buf.len()).map_err(|e| comm_err(peer, e))?;
    let wire: Vec<WireEdge> = decode_records(&raw).map_err(|e| comm_err(peer, e))?;
    log::debug!(
        "rank {} <- rank {}: {} edges on tag {:#06x}",
        comm.rank(),
        peer,
        n,
        tag.as_u16()
    );
    Ok(wire.iter().map(WireEdge::get).collect())
}

/// Group-wide agreement on whether every rank is healthy.
///
/// Runs `log₂ P` pairwise rounds (`rank ^ step`), each rank forwarding the
/// lowest failing rank it has heard of. Afterwards every rank holds the same
/// answer, and no rank can leave before all ranks have entered, so the call
/// doubles as a barrier. Returns the lowest failing rank, if any.
///
/// The group size must be a power of two.
pub fn agree_status<C: Communicator>(
    comm: &C,
    tag: CommTag,
    local_failure: bool,
) -> Result<Option<usize>, MstError> {
    let (rank, size) = (comm.rank(), comm.size());
    let mut failed = local_failure.then_some(rank);
    let mut step = 1usize;
    let mut round = 0u16;
    while step < size {
        let partner = rank ^ step;
        let t = tag.offset(round);
        let out = WireStatus::of(failed);
        let s = comm.isend(partner, t.as_u16(), cast_slice(std::slice::from_ref(&out)));
        let theirs: WireStatus = recv_record(comm, partner, t)?;
        let _ = s.wait();
        failed = match (failed, theirs.failed_rank()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        step <<= 1;
        round += 1;
    }
    Ok(failed)
}
