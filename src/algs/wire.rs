//! Fixed, versioned, little-endian wire types for rank-to-rank transfers.

use crate::graph::edge::Edge;
use bytemuck::{Pod, Zeroable};
use std::mem::{align_of, size_of};

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

/// Copy received bytes into freshly zeroed records.
///
/// Received buffers carry no alignment guarantee, so this copies instead of
/// reinterpreting in place.
pub fn decode_records<T: Pod>(bytes: &[u8]) -> Result<Vec<T>, String> {
    if bytes.len() % size_of::<T>() != 0 {
        return Err(format!(
            "{} bytes is not a whole number of {}-byte records",
            bytes.len(),
            size_of::<T>()
        ));
    }
    let mut out = vec![T::zeroed(); bytes.len() / size_of::<T>()];
    cast_slice_mut(&mut out).copy_from_slice(bytes);
    Ok(out)
}

pub fn expect_exact_len(actual: usize, expected: usize) -> Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected {expected} bytes, got {actual}"))
    }
}

/// Bump when the layout or semantics change in incompatible ways.
pub const WIRE_VERSION: u16 = 1;

// All multi-byte integers in these structs are little-endian on the wire.
// We store them pre-LE with `.to_le()` and decode with `.from_le()`.

// ===== Headers =============================================================

/// Number of records in the payload that follows on the next tag.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct WireCount {
    pub version_le: u16,
    pub _pad: u16,
    pub n_le: u32,
}
impl WireCount {
    pub fn new(n: usize) -> Self {
        Self {
            version_le: WIRE_VERSION.to_le(),
            _pad: 0,
            n_le: (n as u32).to_le(),
        }
    }
    pub fn get(&self) -> usize {
        u32::from_le(self.n_le) as usize
    }
    pub fn version(&self) -> u16 {
        u16::from_le(self.version_le)
    }
}

/// Health flag exchanged during the start-up agreement.
///
/// `failed_rank_le` holds the lowest failing rank seen so far, or
/// `u32::MAX` when every rank seen so far is healthy.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct WireStatus {
    pub failed_rank_le: u32,
}
impl WireStatus {
    pub const HEALTHY: u32 = u32::MAX;

    pub fn of(failed_rank: Option<usize>) -> Self {
        let raw = failed_rank.map_or(Self::HEALTHY, |r| r as u32);
        Self {
            failed_rank_le: raw.to_le(),
        }
    }
    pub fn failed_rank(&self) -> Option<usize> {
        match u32::from_le(self.failed_rank_le) {
            Self::HEALTHY => None,
            r => Some(r as usize),
        }
    }
}

// ===== Edge payload ========================================================

/// One edge `(u, v, weight)` on the wire.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct WireEdge {
    pub u_le: u32,
    pub v_le: u32,
    pub weight_le: u32,
}
impl WireEdge {
    pub fn of(e: &Edge) -> Self {
        Self {
            u_le: e.u.to_le(),
            v_le: e.v.to_le(),
            weight_le: e.weight.to_le(),
        }
    }
    pub fn get(&self) -> Edge {
        Edge::new(
            u32::from_le(self.u_le),
            u32::from_le(self.v_le),
            u32::from_le(self.weight_le),
        )
    }
}

// ===== Compile-time sanity checks =========================================

const _: () = {
    // Pod/Zeroable ensures no padding contains uninit when cast to bytes.
    assert!(size_of::<WireCount>() == 8);
    assert!(size_of::<WireStatus>() == 4);
    assert!(size_of::<WireEdge>() == 12);
    assert!(align_of::<WireEdge>() == 4);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_edges() {
        let edges = vec![Edge::new(1, 2, 3), Edge::new(40, 50, 60)];
        let wire: Vec<WireEdge> = edges.iter().map(WireEdge::of).collect();
        let bytes = cast_slice(&wire).to_vec();
        let back: Vec<WireEdge> = decode_records(&bytes).unwrap();
        let back: Vec<Edge> = back.iter().map(WireEdge::get).collect();
        assert_eq!(back, edges);
    }

    #[test]
    fn ragged_payload_is_rejected() {
        let err = decode_records::<WireEdge>(&[0u8; 13]).unwrap_err();
        assert!(err.contains("13 bytes"), "{err}");
    }

    #[test]
    fn count_carries_version() {
        let c = WireCount::new(17);
        assert_eq!(c.get(), 17);
        assert_eq!(c.version(), WIRE_VERSION);
    }

    #[test]
    fn status_sentinel() {
        assert_eq!(WireStatus::of(None).failed_rank(), None);
        assert_eq!(WireStatus::of(Some(3)).failed_rank(), Some(3));
    }

    #[test]
    fn exact_len() {
        assert!(expect_exact_len(8, 8).is_ok());
        assert!(expect_exact_len(4, 8).is_err());
    }
}
