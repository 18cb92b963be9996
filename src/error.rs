//! Error types for the percolation engine.
//!
//! Defines the error enum exposed by the public API and a convenient result
//! alias. All errors are reported at the API boundary, before any
//! union-find work begins (the hot path is infallible).

use std::fmt;

use thiserror::Error;

/// Stable codes describing [`PercolationError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum PercolationErrorCode {
    /// Spanning-cluster detection was requested without coordinates.
    MissingCoords,
    /// The requested axis index is outside the coordinate dimensionality.
    AxisOutOfRange,
    /// The margin fraction is outside `[0, 1]`.
    MarginOutOfRange,
    /// The requested run count is zero.
    ZeroRuns,
    /// An occupation probability is outside `[0, 1]`.
    ProbabilityOutOfRange,
    /// The edge array is not shaped `M x 2`.
    MalformedEdgeShape,
    /// The coordinate array row count does not match the node count.
    MalformedCoordShape,
    /// An edge endpoint references a node outside `[0, N)`.
    NodeOutOfRange,
}

impl PercolationErrorCode {
    /// Returns the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingCoords => "PERCOLATION_MISSING_COORDS",
            Self::AxisOutOfRange => "PERCOLATION_AXIS_OUT_OF_RANGE",
            Self::MarginOutOfRange => "PERCOLATION_MARGIN_OUT_OF_RANGE",
            Self::ZeroRuns => "PERCOLATION_ZERO_RUNS",
            Self::ProbabilityOutOfRange => "PERCOLATION_PROBABILITY_OUT_OF_RANGE",
            Self::MalformedEdgeShape => "PERCOLATION_MALFORMED_EDGE_SHAPE",
            Self::MalformedCoordShape => "PERCOLATION_MALFORMED_COORD_SHAPE",
            Self::NodeOutOfRange => "PERCOLATION_NODE_OUT_OF_RANGE",
        }
    }
}

impl fmt::Display for PercolationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error produced while configuring or running the percolation engine.
///
/// Variants split along "Config" vs. "Shape" lines: `Config*` variants
/// are caller mistakes about *what* to compute (an impossible margin, an
/// absent prerequisite), `Shape*` variants are caller mistakes about the
/// *data* handed in (wrong array shape, an endpoint outside the graph).
/// There is deliberately no constructible "numeric" variant: Beta-quantile
/// underflow at `k = 0` or `k = R` is clamped to `[0, 1]` internally and
/// never surfaces as an error (see [`crate::stats`]).
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PercolationError {
    /// Spanning-cluster detection was requested but no coordinates were
    /// supplied.
    #[error("spanning_cluster=true requires coords, but none were given")]
    ConfigMissingCoords,
    /// The requested axis is outside the coordinate dimensionality.
    #[error("axis {axis} is out of range for {dims}-dimensional coords")]
    ConfigAxisOutOfRange {
        /// The requested axis.
        axis: usize,
        /// The coordinate dimensionality.
        dims: usize,
    },
    /// The margin fraction is outside `[0, 1]`.
    #[error("margin must be within [0, 1], got {margin}")]
    ConfigMarginOutOfRange {
        /// The rejected margin.
        margin: f64,
    },
    /// The requested run count is zero.
    #[error("runs must be at least 1, got {runs}")]
    ConfigZeroRuns {
        /// The rejected run count.
        runs: u32,
    },
    /// An occupation probability is outside `[0, 1]`.
    #[error("occupation probability at index {index} must be within [0, 1], got {value}")]
    ConfigProbabilityOutOfRange {
        /// Index into the `ps` array.
        index: usize,
        /// The rejected probability.
        value: f64,
    },
    /// The edge array is not shaped `M x 2`.
    #[error("edges must be an M x 2 array, got row width {width}")]
    ShapeMalformedEdges {
        /// The observed row width.
        width: usize,
    },
    /// The coordinate array does not have one row per node.
    #[error("coords must have {expected} rows (one per node), got {got}")]
    ShapeMalformedCoords {
        /// The expected row count.
        expected: usize,
        /// The observed row count.
        got: usize,
    },
    /// An edge endpoint references a node outside `[0, N)`.
    #[error("edge {edge_index} references node {node}, but N is {node_count}")]
    ShapeNodeOutOfRange {
        /// Index of the offending edge within the input edge list.
        edge_index: usize,
        /// The out-of-range node id.
        node: i64,
        /// The graph's node count.
        node_count: usize,
    },
}

impl PercolationError {
    /// Retrieves the stable [`PercolationErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> PercolationErrorCode {
        match self {
            Self::ConfigMissingCoords => PercolationErrorCode::MissingCoords,
            Self::ConfigAxisOutOfRange { .. } => PercolationErrorCode::AxisOutOfRange,
            Self::ConfigMarginOutOfRange { .. } => PercolationErrorCode::MarginOutOfRange,
            Self::ConfigZeroRuns { .. } => PercolationErrorCode::ZeroRuns,
            Self::ConfigProbabilityOutOfRange { .. } => {
                PercolationErrorCode::ProbabilityOutOfRange
            }
            Self::ShapeMalformedEdges { .. } => PercolationErrorCode::MalformedEdgeShape,
            Self::ShapeMalformedCoords { .. } => PercolationErrorCode::MalformedCoordShape,
            Self::ShapeNodeOutOfRange { .. } => PercolationErrorCode::NodeOutOfRange,
        }
    }
}

/// Convenient alias for results returned by the percolation API.
pub type Result<T> = core::result::Result<T, PercolationError>;
