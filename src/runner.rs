//! The percolation runner: drives edge additions in a caller-supplied order
//! and records the per-step observables.
//!
//! This is the engine entry point — a pure function over plain index
//! arrays, with no allocation beyond the two output buffers it must
//! produce. It is infallible on the hot path; range validation happens once,
//! before the loop starts, on the `order` permutation and the `u`/`v`
//! endpoint arrays, at the API boundary before any union-find work begins.

use crate::union_find::UnionFind;

/// Sentinel value meaning "spanning-cluster detection is disabled" for
/// [`run_percolation`]'s `aux_0`/`aux_1` parameters.
pub const NO_SENTINEL: i64 = -1;

/// Per-step observables produced by a single percolation realization.
///
/// Both arrays have the same length as the input `order`: `E`, the total
/// edge count including any prepended boundary edges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PercolationTrace {
    /// `max_cluster_size[t]` is the largest component size after the
    /// `(t + 1)`-th edge in `order` has been processed.
    pub max_cluster_size: Vec<usize>,
    /// `spanning[t]` is `true` iff the two sentinel vertices are in the
    /// same component after step `t`. Always `false` when spanning
    /// detection is disabled.
    pub spanning: Vec<bool>,
}

impl PercolationTrace {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            max_cluster_size: Vec::with_capacity(capacity),
            spanning: Vec::with_capacity(capacity),
        }
    }
}

/// Runs a single microcanonical percolation realization.
///
/// `num_nodes_main` is the number of "real" graph nodes; `total_nodes` is
/// the full union-find universe (`num_nodes_main + 2` when spanning
/// detection is enabled, `num_nodes_main` otherwise). `u` and `v` are
/// parallel endpoint arrays of length `E`; `order` is a permutation of
/// `0..E` (the first `B` entries are the boundary-edge indices in natural
/// order, the rest a permutation of the main-graph edge indices).
/// `aux_0`/`aux_1` are the sentinel vertex indices, or [`NO_SENTINEL`] to
/// disable spanning detection.
///
/// # Panics
///
/// Panics if `u`, `v`, and `order` do not all have the same length, or if
/// any endpoint or permutation entry is out of range for `total_nodes`/`E`.
/// Out-of-range indices here are a programmer error in the caller that
/// assembled the edge arrays, not a runtime condition callers recover
/// from — the fallible, boundary-level validation lives in
/// [`crate::ensemble`], which builds these arrays from caller-supplied
/// edge lists.
#[tracing::instrument(skip(u, v, order), fields(e = order.len(), total_nodes))]
pub fn run_percolation(
    num_nodes_main: usize,
    total_nodes: usize,
    u: &[i64],
    v: &[i64],
    order: &[usize],
    aux_0: i64,
    aux_1: i64,
) -> PercolationTrace {
    let _ = num_nodes_main;
    assert_eq!(u.len(), v.len(), "u and v must have equal length");
    assert_eq!(u.len(), order.len(), "order must cover every edge");

    let sentinels = (aux_0 != NO_SENTINEL && aux_1 != NO_SENTINEL)
        .then_some((as_index(aux_0), as_index(aux_1)));

    let mut uf = UnionFind::new(total_nodes);
    let mut trace = PercolationTrace::with_capacity(order.len());
    let mut spanning_latched = false;

    for &edge_index in order {
        let left = as_index(u[edge_index]);
        let right = as_index(v[edge_index]);
        uf.union(left, right);
        trace.max_cluster_size.push(uf.max_size());

        let spans = match sentinels {
            Some((a, b)) if spanning_latched => {
                let _ = (a, b);
                true
            }
            Some((a, b)) => {
                let linked = uf.find(a) == uf.find(b);
                spanning_latched = linked;
                linked
            }
            None => false,
        };
        trace.spanning.push(spans);
    }

    trace
}

fn as_index(value: i64) -> usize {
    usize::try_from(value).expect("vertex index must be non-negative")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn run(
        n: usize,
        edges: &[(i64, i64)],
        order: &[usize],
        sentinels: Option<(i64, i64)>,
    ) -> PercolationTrace {
        let u: Vec<i64> = edges.iter().map(|&(a, _)| a).collect();
        let v: Vec<i64> = edges.iter().map(|&(_, b)| b).collect();
        let total = sentinels.map_or(n, |_| n + 2);
        let (aux_0, aux_1) = sentinels.unwrap_or((NO_SENTINEL, NO_SENTINEL));
        run_percolation(n, total, &u, &v, order, aux_0, aux_1)
    }

    #[test]
    fn empty_graph_produces_empty_traces() {
        let trace = run(3, &[], &[], None);
        assert!(trace.max_cluster_size.is_empty());
        assert!(trace.spanning.is_empty());
    }

    #[test]
    fn triangle_graph_fixed_order() {
        let trace = run(3, &[(0, 1), (1, 2), (0, 2)], &[0, 1, 2], None);
        assert_eq!(trace.max_cluster_size, vec![2, 3, 3]);
        assert_eq!(trace.spanning, vec![false, false, false]);
    }

    #[test]
    fn two_disjoint_pairs_merged_by_final_edge() {
        let trace = run(4, &[(0, 1), (2, 3), (1, 2)], &[0, 1, 2], None);
        assert_eq!(trace.max_cluster_size, vec![2, 2, 4]);
    }

    #[test]
    fn self_loop_is_a_no_op() {
        let trace = run(2, &[(0, 0), (0, 1)], &[0, 1], None);
        assert_eq!(trace.max_cluster_size, vec![1, 2]);
    }

    #[test]
    fn sentinel_pair_detects_spanning() {
        // N=4, side_0={0}, side_1={3}; boundary edges (aux_0=4,0), (aux_1=5,3)
        // prepended ahead of the three main edges.
        let edges = [(4, 0), (5, 3), (0, 1), (1, 2), (2, 3)];
        let trace = run(4, &edges, &[0, 1, 2, 3, 4], Some((4, 5)));
        assert_eq!(trace.spanning, vec![false, false, false, false, true]);
        assert_eq!(trace.max_cluster_size, vec![2, 2, 3, 4, 6]);
    }

    #[test]
    fn spanning_is_monotone_once_latched() {
        let edges = [(2, 0), (3, 1), (0, 1)];
        let trace = run(2, &edges, &[0, 1, 2], Some((2, 3)));
        assert!(!trace.spanning[0]);
        assert!(!trace.spanning[1]);
        assert!(trace.spanning[2]);
    }

    #[rstest]
    #[case::forward(&[0, 1, 2])]
    #[case::reversed(&[2, 1, 0])]
    #[case::shuffled(&[1, 2, 0])]
    fn final_max_size_is_order_independent(#[case] order: &[usize]) {
        let trace = run(4, &[(0, 1), (1, 2), (2, 3)], order, None);
        assert_eq!(trace.max_cluster_size.last().copied(), Some(4));
    }

    #[test]
    fn idempotent_duplicate_edge_does_not_change_observables() {
        let without_dup = run(3, &[(0, 1), (1, 2)], &[0, 1], None);
        let with_dup = run(3, &[(0, 1), (1, 2), (0, 1)], &[0, 1, 2], None);
        assert_eq!(
            with_dup.max_cluster_size[..2],
            without_dup.max_cluster_size[..]
        );
        assert_eq!(with_dup.max_cluster_size[2], without_dup.max_cluster_size[1]);
    }
}
