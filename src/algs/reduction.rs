//! Hypercube reduction of per-rank spanning forests into one global MST.
//!
//! Every rank starts with the edges touching its vertex range. In round `r`
//! (`step = 2^r`) each active rank sorts its edges, keeps only its local
//! minimum spanning forest, and then either
//! - sends that forest to `rank - step` and retires, when `(rank / step)` is
//!   odd, or
//! - receives the forest of `rank + step` and appends it to its own.
//!
//! After `log₂ P` rounds only rank 0 is active. It has accumulated every edge
//! any forest ever selected and runs one last greedy pass over the full
//! vertex range.
//!
//! Dropping an edge in round `r` is safe: it was the heaviest edge on a cycle
//! of the subgraph held by that rank, and the same cycle exists in the full
//! graph, so no minimum spanning tree needs it. Because every crossing edge
//! starts on both ranks it touches, the edges surviving to rank 0 still
//! contain a minimum spanning forest of the whole input.

use crate::algs::communicator::{CommTag, Communicator};
use crate::algs::exchange::{agree_status, recv_edges, send_edges};
use crate::algs::kruskal::{LocalMst, LocalMstBuilder};
use crate::algs::parallel_sort::ParallelSorter;
use crate::algs::partition::VertexPartition;
use crate::config::{MstConfig, validate_group_size, validate_vertices_per_rank};
use crate::graph::edge::Edge;
use crate::io::binary::EdgeReader;
use crate::mst_error::MstError;
use std::io::Read;
use std::time::{Duration, Instant};

/// Wall-clock split of one rank's run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    /// Reading and filtering the input.
    pub parse: Duration,
    /// Waiting on transfers and the start-up agreement.
    pub comm: Duration,
    /// Sorting and greedy selection.
    pub proc: Duration,
}

impl PhaseTimings {
    pub fn total(&self) -> Duration {
        self.parse + self.comm + self.proc
    }

    pub fn without_io(&self) -> Duration {
        self.comm + self.proc
    }
}

/// The global result, held by rank 0.
#[derive(Clone, Debug)]
pub struct MstReport {
    pub n_verts: u32,
    pub weight: u64,
    pub edges: Vec<Edge>,
    pub timings: PhaseTimings,
}

impl MstReport {
    /// `true` if the selected edges connect all vertices.
    pub fn is_spanning_tree(&self) -> bool {
        self.edges.len() + 1 == self.n_verts as usize
    }

    /// Connected components of the input graph (isolated vertices included).
    pub fn components(&self) -> usize {
        self.n_verts as usize - self.edges.len()
    }
}

/// What a rank ends up with once the protocol is over.
#[derive(Clone, Debug)]
pub enum RankOutcome {
    /// Rank 0: the global minimum spanning forest.
    Root(MstReport),
    /// Any other rank: forwarded its forest in `round` and stopped.
    Retired {
        round: u32,
        to: usize,
        timings: PhaseTimings,
    },
}

impl RankOutcome {
    pub fn report(&self) -> Option<&MstReport> {
        match self {
            RankOutcome::Root(r) => Some(r),
            RankOutcome::Retired { .. } => None,
        }
    }

    pub fn into_report(self) -> Option<MstReport> {
        match self {
            RankOutcome::Root(r) => Some(r),
            RankOutcome::Retired { .. } => None,
        }
    }

    pub fn timings(&self) -> &PhaseTimings {
        match self {
            RankOutcome::Root(r) => &r.timings,
            RankOutcome::Retired { timings, .. } => timings,
        }
    }
}

/// A rank's part in one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundRole {
    /// Ship the local forest to `to`, then retire.
    Send { to: usize },
    /// Wait for `from`'s forest and merge it.
    Receive { from: usize },
}

/// Role of `rank` in the round whose pairing distance is `step`.
pub fn round_role(rank: usize, step: usize) -> RoundRole {
    if (rank / step) % 2 == 1 {
        RoundRole::Send { to: rank - step }
    } else {
        RoundRole::Receive { from: rank + step }
    }
}

/// The rounds `rank` takes part in, as `(round, step, role)`.
///
/// The sequence ends with the rank's single `Send`; rank 0 only receives.
pub fn schedule(rank: usize, size: usize) -> impl Iterator<Item = (u32, usize, RoundRole)> {
    let rounds = size.max(1).trailing_zeros();
    let mut done = false;
    (0..rounds).map_while(move |round| {
        if done {
            return None;
        }
        let step = 1usize << round;
        let role = round_role(rank, step);
        done = matches!(role, RoundRole::Send { .. });
        Some((round, step, role))
    })
}

/// Drives one rank through loading, agreement and the reduction rounds.
///
/// The coordinator owns the rank's edge and scratch buffers; they are reused
/// from round to round. The sort pool is built while loading, so a rank that
/// cannot start its workers still reaches the status agreement.
pub struct ReductionCoordinator<'c, C: Communicator> {
    comm: &'c C,
    config: MstConfig,
    sorter: Option<ParallelSorter>,
    n_verts: u32,
    edges: Vec<Edge>,
    scratch: Vec<Edge>,
    timings: PhaseTimings,
}

impl<'c, C: Communicator> ReductionCoordinator<'c, C> {
    /// Check the process topology. Nothing is read yet.
    ///
    /// Every rank sees the same group size, so a rejection here is unanimous.
    pub fn new(comm: &'c C, config: MstConfig) -> Result<Self, MstError> {
        validate_group_size(comm.size())?;
        Ok(Self {
            comm,
            config,
            sorter: None,
            n_verts: 0,
            edges: Vec::new(),
            scratch: Vec::new(),
            timings: PhaseTimings::default(),
        })
    }

    fn status_tag(&self) -> CommTag {
        CommTag::new(self.config.tag_base)
    }

    fn round_tag(&self, round: u32) -> CommTag {
        CommTag::new(self.config.tag_base).offset(0x40 + 2 * round as u16)
    }

    /// Read the binary graph from `reader`, keeping the edges this rank owns.
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), MstError> {
        let start = Instant::now();
        self.prepare()?;
        let stream = EdgeReader::new(reader)?;
        let n_verts = stream.header().n_verts;
        self.install(n_verts, stream)?;
        self.timings.parse += start.elapsed();
        Ok(())
    }

    /// Like [`load`](Self::load), for a graph already in memory.
    pub fn load_edges(&mut self, n_verts: u32, edges: &[Edge]) -> Result<(), MstError> {
        let start = Instant::now();
        self.prepare()?;
        let checked = edges.iter().map(|e| {
            if e.u >= n_verts || e.v >= n_verts {
                Err(MstError::VertexOutOfRange {
                    u: e.u,
                    v: e.v,
                    n_verts,
                })
            } else {
                Ok(*e)
            }
        });
        self.install(n_verts, checked)?;
        self.timings.parse += start.elapsed();
        Ok(())
    }

    /// Rank-local setup that may fail on one rank only.
    fn prepare(&mut self) -> Result<(), MstError> {
        self.config.validate()?;
        if self.sorter.is_none() {
            self.sorter = Some(ParallelSorter::new(self.config.sort_workers)?);
        }
        Ok(())
    }

    fn install<I>(&mut self, n_verts: u32, edges: I) -> Result<(), MstError>
    where
        I: IntoIterator<Item = Result<Edge, MstError>>,
    {
        validate_vertices_per_rank(n_verts, self.comm.size())?;
        let part = VertexPartition::for_rank(n_verts, self.comm.rank(), self.comm.size());
        self.edges = part.filter_edges(edges)?;
        self.scratch = Vec::with_capacity(self.edges.len());
        self.n_verts = n_verts;
        Ok(())
    }

    /// Start-up agreement and barrier.
    ///
    /// `local` is this rank's loading outcome. Every rank learns whether any
    /// rank failed before anyone waits on a round transfer, so a single bad
    /// rank makes the whole group stop instead of leaving peers blocked.
    pub fn synchronize(&mut self, local: Result<(), MstError>) -> Result<(), MstError> {
        let start = Instant::now();
        let failed = agree_status(self.comm, self.status_tag(), local.is_err())?;
        self.timings.comm += start.elapsed();
        local?;
        match failed {
            Some(rank) => Err(MstError::PeerFailed { rank }),
            None => Ok(()),
        }
    }

    /// Sort the held edges and keep their minimum spanning forest.
    fn local_mst(&mut self) -> Result<LocalMst, MstError> {
        let sorter = self.sorter.as_ref().ok_or(MstError::NotLoaded)?;
        sorter.sort_vec(&mut self.edges, &mut self.scratch);
        LocalMstBuilder::new(self.n_verts).build(&self.edges)
    }

    /// Run the reduction rounds. Must follow a successful
    /// [`synchronize`](Self::synchronize).
    pub fn run(mut self) -> Result<RankOutcome, MstError> {
        let (rank, size) = (self.comm.rank(), self.comm.size());
        let start = Instant::now();
        let mut waited = Duration::ZERO;

        for (round, step, role) in schedule(rank, size) {
            let local = self.local_mst()?;
            log::debug!(
                "rank {rank} round {round} (step {step}): {} edges -> forest of {} (weight {})",
                self.edges.len(),
                local.len(),
                local.weight
            );
            let tag = self.round_tag(round);
            match role {
                RoundRole::Send { to } => {
                    let t = Instant::now();
                    send_edges(self.comm, to, tag, &local.edges);
                    waited += t.elapsed();
                    self.timings.comm += waited;
                    self.timings.proc += start.elapsed() - waited;
                    return Ok(RankOutcome::Retired {
                        round,
                        to,
                        timings: self.timings,
                    });
                }
                RoundRole::Receive { from } => {
                    let t = Instant::now();
                    let theirs = recv_edges(self.comm, from, tag)?;
                    waited += t.elapsed();
                    self.edges.clear();
                    self.edges.extend_from_slice(&local.edges);
                    self.edges.extend_from_slice(&theirs);
                }
            }
        }

        debug_assert_eq!(rank, 0, "only rank 0 outlives every round");
        let mst = self.local_mst()?;
        self.timings.comm += waited;
        self.timings.proc += start.elapsed() - waited;

        let report = MstReport {
            n_verts: self.n_verts,
            weight: mst.weight,
            edges: mst.edges,
            timings: self.timings,
        };
        if !report.is_spanning_tree() {
            log::warn!(
                "input is disconnected: {} components, forest of {} edges",
                report.components(),
                report.edges.len()
            );
        }
        log::info!(
            "MST over {} vertices: {} edges, weight {}",
            report.n_verts,
            report.edges.len(),
            report.weight
        );
        Ok(RankOutcome::Root(report))
    }
}

/// Validate, load through `open`, agree and reduce: a whole run for one rank.
///
/// `open` is only called after the process topology has been accepted.
pub fn distributed_mst<C, R, F>(
    comm: &C,
    config: &MstConfig,
    open: F,
) -> Result<RankOutcome, MstError>
where
    C: Communicator,
    R: Read,
    F: FnOnce() -> Result<R, MstError>,
{
    let mut coordinator = ReductionCoordinator::new(comm, config.clone())?;
    let loaded = open().and_then(|reader| coordinator.load(reader));
    coordinator.synchronize(loaded)?;
    coordinator.run()
}

/// [`distributed_mst`] over a graph already in memory on every rank.
pub fn distributed_mst_from_edges<C: Communicator>(
    comm: &C,
    config: &MstConfig,
    n_verts: u32,
    edges: &[Edge],
) -> Result<RankOutcome, MstError> {
    let mut coordinator = ReductionCoordinator::new(comm, config.clone())?;
    let loaded = coordinator.load_edges(n_verts, edges);
    coordinator.synchronize(loaded)?;
    coordinator.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::communicator::NoComm;

    #[test]
    fn roles_follow_rank_parity() {
        assert_eq!(round_role(1, 1), RoundRole::Send { to: 0 });
        assert_eq!(round_role(2, 1), RoundRole::Receive { from: 3 });
        assert_eq!(round_role(2, 2), RoundRole::Send { to: 0 });
        assert_eq!(round_role(4, 2), RoundRole::Receive { from: 6 });
        assert_eq!(round_role(6, 2), RoundRole::Send { to: 4 });
    }

    #[test]
    fn schedule_stops_after_send() {
        let s6: Vec<_> = schedule(6, 8).collect();
        assert_eq!(
            s6,
            vec![
                (0, 1, RoundRole::Receive { from: 7 }),
                (1, 2, RoundRole::Send { to: 4 }),
            ]
        );
        let s0: Vec<_> = schedule(0, 8).map(|(_, _, r)| r).collect();
        assert_eq!(
            s0,
            vec![
                RoundRole::Receive { from: 1 },
                RoundRole::Receive { from: 2 },
                RoundRole::Receive { from: 4 },
            ]
        );
        assert_eq!(schedule(0, 1).count(), 0);
    }

    #[test]
    fn every_rank_but_root_sends_exactly_once() {
        for size in [2usize, 4, 8, 16] {
            let mut received = vec![0usize; size];
            for rank in 0..size {
                let sends: Vec<_> = schedule(rank, size)
                    .filter_map(|(_, _, r)| match r {
                        RoundRole::Send { to } => Some(to),
                        RoundRole::Receive { .. } => None,
                    })
                    .collect();
                assert_eq!(sends.len(), usize::from(rank != 0), "size {size} rank {rank}");
                for to in sends {
                    received[to] += 1;
                }
            }
            assert_eq!(received.iter().sum::<usize>(), size - 1);
        }
    }

    #[test]
    fn serial_run_is_one_greedy_pass() {
        let edges = [
            Edge::new(0, 1, 1),
            Edge::new(1, 2, 2),
            Edge::new(2, 3, 3),
            Edge::new(0, 3, 10),
        ];
        let outcome =
            distributed_mst_from_edges(&NoComm, &MstConfig::default(), 4, &edges).unwrap();
        let report = outcome.into_report().expect("rank 0 holds the result");
        assert_eq!(report.weight, 6);
        assert!(report.is_spanning_tree());
    }

    #[test]
    fn too_few_vertices_is_reported_after_agreement() {
        let err = distributed_mst_from_edges(&NoComm, &MstConfig::default(), 1, &[])
            .unwrap_err();
        assert!(matches!(err, MstError::TooFewVerticesPerRank { n_verts: 1, ranks: 1 }));
    }

    #[test]
    fn run_needs_loaded_input() {
        let coordinator = ReductionCoordinator::new(&NoComm, MstConfig::default()).unwrap();
        assert!(matches!(coordinator.run(), Err(MstError::NotLoaded)));
    }

    #[test]
    fn bad_worker_count_is_a_load_failure() {
        let config = MstConfig::default().with_sort_workers(0);
        let mut coordinator = ReductionCoordinator::new(&NoComm, config).unwrap();
        let loaded = coordinator.load_edges(4, &[Edge::new(0, 1, 1)]);
        assert!(matches!(loaded, Err(MstError::InvalidWorkerCount(0))));
        let err = coordinator.synchronize(loaded).unwrap_err();
        assert!(matches!(err, MstError::InvalidWorkerCount(0)));
    }

    #[test]
    fn timings_add_up() {
        let t = PhaseTimings {
            parse: Duration::from_millis(5),
            comm: Duration::from_millis(7),
            proc: Duration::from_millis(11),
        };
        assert_eq!(t.total(), Duration::from_millis(23));
        assert_eq!(t.without_io(), Duration::from_millis(18));
    }
}
