//! Chunked edge sort on a fixed-size worker pool.
//!
//! The edge slice is cut into `T` contiguous chunks at `i * len / T`, every
//! worker sorts one chunk by weight, and then `⌈log₂ T⌉` merge levels pair
//! up adjacent runs until one run spans the slice. Each level writes into
//! the other buffer, so source and scratch swap roles between levels.
//!
//! Every task of a phase owns a disjoint index range of its output buffer;
//! the only synchronisation is the join at the end of each `scope`.

use crate::graph::edge::Edge;
use crate::mst_error::MstError;
use itertools::Itertools;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Sorts edge collections by ascending weight on a private thread pool.
///
/// The order among equal weights is unspecified.
pub struct ParallelSorter {
    pool: ThreadPool,
    workers: usize,
}

impl std::fmt::Debug for ParallelSorter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelSorter")
            .field("workers", &self.workers)
            .finish()
    }
}

impl ParallelSorter {
    /// Build a sorter backed by `workers` threads.
    pub fn new(workers: usize) -> Result<Self, MstError> {
        if workers == 0 {
            return Err(MstError::InvalidWorkerCount(workers));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("mst-sort-{i}"))
            .build()?;
        let sorter = Self { pool, workers };
        log::debug!(
            "sort pool: {} workers, {} merge levels",
            sorter.workers,
            sorter.merge_levels()
        );
        Ok(sorter)
    }

    /// Number of merge levels run after the chunk sort.
    #[inline]
    pub fn merge_levels(&self) -> u32 {
        self.workers.next_power_of_two().trailing_zeros()
    }

    /// Sort `edges` ascending by weight, using `scratch` as the merge target.
    ///
    /// `scratch` is overwritten. The result always ends up in `edges`.
    ///
    /// # Panics
    /// Panics if `scratch` is shorter than `edges`.
    pub fn sort(&self, edges: &mut [Edge], scratch: &mut [Edge]) {
        let n = edges.len();
        assert!(
            scratch.len() >= n,
            "scratch buffer holds {} edges, need {n}",
            scratch.len()
        );
        if n < 2 {
            return;
        }
        let scratch = &mut scratch[..n];
        let mut bounds = chunk_bounds(n, self.workers);

        let chunks = split_runs_mut(&mut *edges, &bounds);
        self.pool.scope(move |s| {
            for chunk in chunks {
                s.spawn(move |_| chunk.sort_unstable_by(Edge::cmp_weight));
            }
        });

        let mut in_scratch = false;
        while bounds.len() > 2 {
            let next = merged_bounds(&bounds);
            let (src, dst): (&[Edge], &mut [Edge]) = if in_scratch {
                (&*scratch, &mut *edges)
            } else {
                (&*edges, &mut *scratch)
            };
            let runs = bounds.len() - 1;
            let tasks: Vec<_> = split_runs_mut(dst, &next)
                .into_iter()
                .enumerate()
                .map(|(k, out)| {
                    let j = 2 * k;
                    let (lo, mid) = (bounds[j], bounds[j + 1]);
                    let hi = bounds[(j + 2).min(runs)];
                    (&src[lo..mid], &src[mid..hi], out)
                })
                .collect();
            self.pool.scope(move |s| {
                for (a, b, out) in tasks {
                    s.spawn(move |_| merge_runs(a, b, out));
                }
            });
            log::trace!("merge level: {} runs -> {}", runs, next.len() - 1);
            bounds = next;
            in_scratch = !in_scratch;
        }

        if in_scratch {
            edges.copy_from_slice(scratch);
        }
    }

    /// Sort a vector, growing `scratch` to match if needed.
    pub fn sort_vec(&self, edges: &mut [Edge], scratch: &mut Vec<Edge>) {
        if scratch.len() < edges.len() {
            scratch.resize(edges.len(), Edge::default());
        }
        self.sort(edges, scratch);
    }
}

/// Chunk boundaries `i * len / parts` for `i` in `0..=parts`.
///
/// Adjacent chunks differ in size by at most one element.
pub fn chunk_bounds(len: usize, parts: usize) -> Vec<usize> {
    let parts = parts.max(1);
    (0..=parts).map(|i| i * len / parts).collect()
}

/// Boundaries after merging runs pairwise; an odd trailing run is carried.
fn merged_bounds(bounds: &[usize]) -> Vec<usize> {
    let runs = bounds.len() - 1;
    let mut next: Vec<usize> = bounds.iter().step_by(2).copied().collect();
    if runs % 2 == 1 {
        next.push(bounds[runs]);
    }
    next
}

/// Split `rest` into the disjoint runs described by `bounds` (starting at 0).
fn split_runs_mut<'a, T>(mut rest: &'a mut [T], bounds: &[usize]) -> Vec<&'a mut [T]> {
    let mut out = Vec::with_capacity(bounds.len().saturating_sub(1));
    for (lo, hi) in bounds.iter().tuple_windows() {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(hi - lo);
        out.push(head);
        rest = tail;
    }
    out
}

/// Linear two-pointer merge of two sorted runs into `out`.
fn merge_runs(a: &[Edge], b: &[Edge], out: &mut [Edge]) {
    debug_assert_eq!(a.len() + b.len(), out.len());
    let (mut i, mut j) = (0, 0);
    for slot in out.iter_mut() {
        let take_a = j >= b.len() || (i < a.len() && a[i].weight <= b[j].weight);
        if take_a {
            *slot = a[i];
            i += 1;
        } else {
            *slot = b[j];
            j += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::edge::is_sorted_by_weight;

    fn weights(ws: &[u32]) -> Vec<Edge> {
        ws.iter()
            .enumerate()
            .map(|(i, &w)| Edge::new(i as u32, i as u32 + 1, w))
            .collect()
    }

    #[test]
    fn bounds_cover_and_balance() {
        let b = chunk_bounds(10, 4);
        assert_eq!(b, vec![0, 2, 5, 7, 10]);
        let sizes: Vec<_> = b.windows(2).map(|w| w[1] - w[0]).collect();
        let (min, max) = (sizes.iter().min().unwrap(), sizes.iter().max().unwrap());
        assert!(max - min <= 1);
    }

    #[test]
    fn merged_bounds_carry_odd_run() {
        assert_eq!(merged_bounds(&[0, 2, 5, 7, 10]), vec![0, 5, 10]);
        assert_eq!(merged_bounds(&[0, 3, 6, 9]), vec![0, 6, 9]);
        assert_eq!(merged_bounds(&[0, 6, 9]), vec![0, 9]);
    }

    #[test]
    fn merge_two_runs() {
        let a = weights(&[1, 4, 9]);
        let b = weights(&[2, 3, 10, 11]);
        let mut out = vec![Edge::default(); 7];
        merge_runs(&a, &b, &mut out);
        let ws: Vec<_> = out.iter().map(|e| e.weight).collect();
        assert_eq!(ws, vec![1, 2, 3, 4, 9, 10, 11]);
    }

    #[test]
    fn merge_levels_round_up() {
        assert_eq!(ParallelSorter::new(1).unwrap().merge_levels(), 0);
        assert_eq!(ParallelSorter::new(2).unwrap().merge_levels(), 1);
        assert_eq!(ParallelSorter::new(3).unwrap().merge_levels(), 2);
        assert_eq!(ParallelSorter::new(8).unwrap().merge_levels(), 3);
    }

    #[test]
    fn zero_workers_is_an_error() {
        assert!(matches!(
            ParallelSorter::new(0),
            Err(MstError::InvalidWorkerCount(0))
        ));
    }

    #[test]
    fn sorts_with_odd_worker_counts() {
        for workers in 1..=7 {
            let sorter = ParallelSorter::new(workers).unwrap();
            let mut edges = weights(&[9, 3, 7, 1, 8, 2, 2, 6, 5, 4, 0]);
            let mut scratch = Vec::new();
            sorter.sort_vec(&mut edges, &mut scratch);
            assert!(is_sorted_by_weight(&edges), "workers={workers}: {edges:?}");
        }
    }

    #[test]
    fn more_workers_than_edges() {
        let sorter = ParallelSorter::new(8).unwrap();
        let mut edges = weights(&[3, 1, 2]);
        let mut scratch = vec![Edge::default(); 3];
        sorter.sort(&mut edges, &mut scratch);
        assert_eq!(
            edges.iter().map(|e| e.weight).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn empty_and_single() {
        let sorter = ParallelSorter::new(4).unwrap();
        let mut none: Vec<Edge> = Vec::new();
        sorter.sort(&mut none, &mut []);
        let mut one = weights(&[5]);
        sorter.sort(&mut one, &mut [Edge::default()]);
        assert_eq!(one[0].weight, 5);
    }
}
