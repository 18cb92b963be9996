//! Weighted union-find with running maximum-component-size tracking.
//!
//! This is the hot path of the percolation engine: edges are added
//! one-by-one and after each addition the caller needs the current size of
//! the largest component without rescanning every root. The structure below
//! tracks that maximum incrementally instead of recomputing it with a heap
//! or a full scan.
//!
//! Each realization is single-threaded end to end: no atomics, no locks,
//! just plain `Vec<usize>` indexing with two-pass path compression and
//! union-by-size, so the winning root's `size` doubles as the
//! maximum-tracking signal.

/// Fixed-size union-find over `0..universe_size`, weighted by tree size.
///
/// Construction allocates once; `find` and `union` never allocate.
#[derive(Clone, Debug)]
pub(crate) struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
    max_size: usize,
}

impl UnionFind {
    /// Creates a fresh union-find over `universe_size` singleton nodes.
    ///
    /// `max_size` starts at `1` (or `0` for an empty universe).
    pub(crate) fn new(universe_size: usize) -> Self {
        Self {
            parent: (0..universe_size).collect(),
            size: vec![1; universe_size],
            max_size: usize::from(universe_size > 0),
        }
    }

    /// Returns the size of the current largest component.
    pub(crate) const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Finds the root of `node`, compressing every visited node's parent
    /// pointer to point directly at the root.
    ///
    /// Two passes: the first walks to the root, the second rewrites the
    /// path. Indices are assumed to be in range; out-of-range indices are a
    /// programmer error and panic via the underlying `Vec` index, not a
    /// `Result`.
    pub(crate) fn find(&mut self, node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut current = node;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }

        root
    }

    /// Merges the components containing `left` and `right`.
    ///
    /// Returns `true` if a merge happened (the components were distinct),
    /// `false` if they were already the same component (including
    /// self-loops, where `left == right`). The smaller tree is attached
    /// under the larger; ties attach the second root under the first. On a
    /// merge, `max_size` is updated if the combined tree is now the
    /// largest.
    pub(crate) fn union(&mut self, left: usize, right: usize) -> bool {
        let mut left_root = self.find(left);
        let mut right_root = self.find(right);
        if left_root == right_root {
            return false;
        }

        if self.size[left_root] < self.size[right_root] {
            std::mem::swap(&mut left_root, &mut right_root);
        }

        self.parent[right_root] = left_root;
        self.size[left_root] += self.size[right_root];

        if self.size[left_root] > self.max_size {
            self.max_size = self.size[left_root];
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn fresh_universe_has_singleton_max_size() {
        let uf = UnionFind::new(5);
        assert_eq!(uf.max_size(), 1);
    }

    #[test]
    fn empty_universe_has_zero_max_size() {
        let uf = UnionFind::new(0);
        assert_eq!(uf.max_size(), 0);
    }

    #[test]
    fn union_merges_and_tracks_max() {
        let mut uf = UnionFind::new(4);
        assert!(uf.union(0, 1));
        assert_eq!(uf.max_size(), 2);
        assert!(uf.union(2, 3));
        assert_eq!(uf.max_size(), 2);
        assert!(uf.union(1, 2));
        assert_eq!(uf.max_size(), 4);
    }

    #[test]
    fn self_loop_is_a_no_op() {
        let mut uf = UnionFind::new(3);
        assert!(!uf.union(0, 0));
        assert_eq!(uf.max_size(), 1);
    }

    #[test]
    fn duplicate_edge_is_a_no_op() {
        let mut uf = UnionFind::new(3);
        assert!(uf.union(0, 1));
        assert!(!uf.union(0, 1));
        assert!(!uf.union(1, 0));
        assert_eq!(uf.max_size(), 2);
    }

    #[test]
    fn find_compresses_path_to_root() {
        let mut uf = UnionFind::new(4);
        uf.union(0, 1);
        uf.union(1, 2);
        uf.union(2, 3);
        let root = uf.find(3);
        for node in 0..4 {
            assert_eq!(uf.find(node), root);
            assert_eq!(uf.parent[node], root);
        }
    }

    #[rstest]
    #[case::pair(2)]
    #[case::quad(4)]
    #[case::octet(8)]
    fn fully_merged_chain_has_universe_sized_max(#[case] n: usize) {
        let mut uf = UnionFind::new(n);
        for i in 1..n {
            uf.union(i - 1, i);
        }
        assert_eq!(uf.max_size(), n);
    }
}
