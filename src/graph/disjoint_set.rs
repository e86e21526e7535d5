//! Disjoint-set forest over the global vertex index space.
//!
//! Nodes live in an arena addressed by vertex index; a node whose parent slot
//! holds its own index is a root. `find` compresses the whole traversed path
//! onto the root and `union` links by rank, so a sequence of operations runs
//! in near-constant amortised time per call.

/// Union-find arena: `parent[i]` and `rank[i]` describe vertex `i`.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<u32>,
    rank: Vec<u32>,
}

impl DisjointSet {
    /// `MakeSet(n)`: `n` singleton sets, every node its own root with rank 0.
    pub fn new(n: u32) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n as usize],
        }
    }

    /// Number of vertices tracked.
    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of `x`'s set.
    ///
    /// Every node visited on the way up is rewritten to point straight at the
    /// root. The representative a component resolves to never changes.
    ///
    /// # Panics
    /// Panics if `x` is outside the arena.
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut cur = x;
        while cur != root {
            let next = self.parent[cur as usize];
            self.parent[cur as usize] = root;
            cur = next;
        }
        root
    }

    /// Merge the sets containing `x` and `y`.
    ///
    /// The caller must have checked that the two lie in different sets; the
    /// greedy pass always holds both roots already. The shallower root goes
    /// under the deeper one; on a tie `x`'s root goes under `y`'s and `y`'s
    /// rank grows by one.
    pub fn union(&mut self, x: u32, y: u32) {
        let rx = self.find(x);
        let ry = self.find(y);
        debug_assert_ne!(rx, ry, "union called on members of the same set");
        let (rank_x, rank_y) = (self.rank[rx as usize], self.rank[ry as usize]);
        if rank_x < rank_y {
            self.parent[rx as usize] = ry;
        } else if rank_x > rank_y {
            self.parent[ry as usize] = rx;
        } else {
            self.parent[rx as usize] = ry;
            self.rank[ry as usize] += 1;
        }
    }

    /// `true` if `x` and `y` currently share a representative.
    #[inline]
    pub fn same_set(&mut self, x: u32, y: u32) -> bool {
        self.find(x) == self.find(y)
    }

    /// Number of disjoint sets currently in the forest.
    pub fn count_sets(&self) -> usize {
        self.parent
            .iter()
            .enumerate()
            .filter(|&(i, &p)| i as u32 == p)
            .count()
    }
}
