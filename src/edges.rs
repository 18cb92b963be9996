//! Edge-list validation and node-count inference for the high-level API.
//!
//! The node count is inferred from the edges (the largest endpoint plus
//! one), widened to cover every coordinate row when coordinates are
//! supplied, since isolated nodes with no incident edge are legitimate (an
//! empty edge list with non-empty coordinates is a valid graph of isolated
//! nodes). A coordinate array that is *too small* to cover every edge
//! endpoint is rejected rather than silently under-indexed.

use crate::error::{PercolationError, Result};

/// Edges and node count validated and ready for [`crate::runner`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ValidatedEdges {
    pub(crate) node_count: usize,
    pub(crate) u: Vec<i64>,
    pub(crate) v: Vec<i64>,
}

/// Validates an `M x 2` edge array (each row `[u, v]`) against an optional
/// coordinate row count, inferring the node count `N` when `coords_rows`
/// is `None`.
///
/// # Errors
///
/// Returns [`PercolationError::ShapeMalformedCoords`] if `coords_rows` is
/// supplied but smaller than the node count implied by the edges, or
/// [`PercolationError::ShapeNodeOutOfRange`] if any endpoint is negative.
pub(crate) fn prepare_edges(
    edges: &[[i64; 2]],
    coords_rows: Option<usize>,
) -> Result<ValidatedEdges> {
    let mut max_index: i64 = -1;
    for &[a, b] in edges {
        max_index = max_index.max(a).max(b);
    }
    let inferred = if max_index < 0 {
        0
    } else {
        (max_index as usize) + 1
    };

    let node_count = match coords_rows {
        Some(rows) if rows < inferred => {
            return Err(PercolationError::ShapeMalformedCoords {
                expected: inferred,
                got: rows,
            });
        }
        Some(rows) => rows,
        None => inferred,
    };

    for (edge_index, &[a, b]) in edges.iter().enumerate() {
        for node in [a, b] {
            if node < 0 {
                return Err(PercolationError::ShapeNodeOutOfRange {
                    edge_index,
                    node,
                    node_count,
                });
            }
        }
    }

    let u = edges.iter().map(|e| e[0]).collect();
    let v = edges.iter().map(|e| e[1]).collect();
    Ok(ValidatedEdges { node_count, u, v })
}

/// Reassembles an `M x 2` edge array from a flat row-major buffer, the
/// shape a caller crossing an FFI or serialization boundary typically hands
/// over (e.g. a flattened `numpy` array plus its row width).
///
/// # Errors
///
/// Returns [`PercolationError::ShapeMalformedEdges`] if `row_width != 2` or
/// `flat`'s length is not a multiple of `row_width`.
pub fn edges_from_flat(flat: &[i64], row_width: usize) -> Result<Vec<[i64; 2]>> {
    if row_width != 2 || flat.len() % row_width != 0 {
        return Err(PercolationError::ShapeMalformedEdges { width: row_width });
    }
    Ok(flat.chunks_exact(2).map(|chunk| [chunk[0], chunk[1]]).collect())
}
