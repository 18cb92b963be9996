//! Boundary setup: turns node coordinates into the two sentinel vertices and
//! the virtual edges that wire them to the nodes on each face of the
//! sample.
//!
//! Computes an axis-aligned slab at each end of the sample along the
//! chosen axis and classifies every node against it, building the two node
//! sets from one coordinate column and an inclusive margin on each side.

use crate::error::{PercolationError, Result};

/// The two reserved union-find indices used for spanning detection, plus
/// the synthesized boundary edges and their count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundarySetup {
    /// The "low side" sentinel vertex index, always `N`.
    pub aux_0: usize,
    /// The "high side" sentinel vertex index, always `N + 1`.
    pub aux_1: usize,
    /// Edges `(aux_0, n)` for every `n` on the low side, followed by
    /// `(aux_1, n)` for every `n` on the high side, in ascending node order.
    pub boundary_edges: Vec<(usize, usize)>,
}

impl BoundarySetup {
    /// The number of boundary edges, `B`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boundary_edges.len()
    }

    /// Whether there are no boundary edges at all (e.g. every node sits
    /// strictly between the two margins).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundary_edges.is_empty()
    }
}

/// Selects the low- and high-side boundary node sets along `axis` and
/// synthesizes the sentinel edges that wire them to `aux_0`/`aux_1`.
///
/// `coords` is a flat, row-major `N x D` buffer (row `n`'s value on `axis`
/// is `coords[n * dims + axis]`); this avoids committing the crate to a
/// fixed dimensionality or an external ndarray dependency the rest of the
/// stack does not otherwise need.
///
/// # Errors
///
/// Returns [`PercolationError::ConfigAxisOutOfRange`] if `axis >= dims`, or
/// [`PercolationError::ConfigMarginOutOfRange`] if `margin` is outside
/// `[0, 1]`.
#[tracing::instrument(skip(coords), fields(node_count, dims, axis, margin))]
pub fn select_boundary(
    coords: &[f64],
    dims: usize,
    axis: usize,
    margin: f64,
) -> Result<BoundarySetup> {
    if axis >= dims {
        return Err(PercolationError::ConfigAxisOutOfRange { axis, dims });
    }
    if !(0.0..=1.0).contains(&margin) {
        return Err(PercolationError::ConfigMarginOutOfRange { margin });
    }

    let node_count = if dims == 0 { 0 } else { coords.len() / dims };
    let aux_0 = node_count;
    let aux_1 = node_count + 1;

    if node_count == 0 {
        return Ok(BoundarySetup {
            aux_0,
            aux_1,
            boundary_edges: Vec::new(),
        });
    }

    let values: Vec<f64> = (0..node_count)
        .map(|node| coords[node * dims + axis])
        .collect();
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = hi - lo;

    // Guarded explicitly rather than folded into the threshold arithmetic:
    // when range == 0 every node must match both sides regardless of
    // margin, which the plain `lo + margin * range` formula also produces,
    // but spelling it out keeps the degenerate case from reading as an
    // accident of floating-point zero propagation.
    let (low_threshold, high_threshold) = if range == 0.0 {
        (lo, hi)
    } else {
        (lo + margin * range, hi - margin * range)
    };

    let mut boundary_edges = Vec::new();
    for (node, &value) in values.iter().enumerate() {
        if value <= low_threshold {
            boundary_edges.push((aux_0, node));
        }
    }
    for (node, &value) in values.iter().enumerate() {
        if value >= high_threshold {
            boundary_edges.push((aux_1, node));
        }
    }

    Ok(BoundarySetup {
        aux_0,
        aux_1,
        boundary_edges,
    })
}
