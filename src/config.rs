//! Configuration for the ensemble-level API.
//!
//! `StatisticsConfigBuilder` follows the usual builder shape: fluent
//! `with_*` setters accumulate state infallibly, and every validation rule
//! runs once, in `build()`, before any union-find work begins.

use crate::error::{PercolationError, Result};

/// Row-major `N x D` node coordinates, flattened to avoid pulling in an
/// ndarray dependency the rest of the crate does not otherwise need.
#[derive(Clone, Debug, PartialEq)]
pub struct Coords {
    values: Vec<f64>,
    dims: usize,
}

impl Coords {
    /// Wraps a flat row-major buffer with the given dimensionality.
    ///
    /// # Panics
    ///
    /// Panics if `dims == 0` while `values` is non-empty, or if `values`'s
    /// length is not a multiple of `dims`.
    #[must_use]
    pub fn new(values: Vec<f64>, dims: usize) -> Self {
        assert!(
            dims > 0 || values.is_empty(),
            "dims must be positive for non-empty coordinates"
        );
        assert!(
            dims == 0 || values.len() % dims == 0,
            "coordinate buffer length must be a multiple of dims"
        );
        Self { values, dims }
    }

    /// The coordinate dimensionality `D`.
    #[must_use]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// The number of coordinate rows (nodes covered by this array).
    #[must_use]
    pub fn node_count(&self) -> usize {
        if self.dims == 0 { 0 } else { self.values.len() / self.dims }
    }

    /// The flat row-major buffer backing this coordinate array.
    #[must_use]
    pub fn as_flat(&self) -> &[f64] {
        &self.values
    }
}

/// Validated configuration for [`crate::compute_percolation_statistics`].
#[derive(Clone, Debug, PartialEq)]
pub struct StatisticsConfig {
    pub(crate) spanning_cluster: bool,
    pub(crate) coords: Option<Coords>,
    pub(crate) axis: usize,
    pub(crate) margin: f64,
    pub(crate) runs: u32,
    pub(crate) ps: Vec<f64>,
    pub(crate) seed: Option<u64>,
    pub(crate) num_workers: Option<usize>,
}

impl StatisticsConfig {
    /// Whether spanning-cluster detection is enabled.
    #[must_use]
    pub fn spanning_cluster(&self) -> bool {
        self.spanning_cluster
    }

    /// The configured occupation probabilities.
    #[must_use]
    pub fn ps(&self) -> &[f64] {
        &self.ps
    }

    /// The configured ensemble run count.
    #[must_use]
    pub fn runs(&self) -> u32 {
        self.runs
    }
}

/// Builds a [`StatisticsConfig`], validating every configuration
/// constraint exactly once, in [`StatisticsConfigBuilder::build`].
#[derive(Clone, Debug)]
pub struct StatisticsConfigBuilder {
    spanning_cluster: bool,
    coords: Option<Coords>,
    axis: usize,
    margin: f64,
    runs: u32,
    ps: Vec<f64>,
    seed: Option<u64>,
    num_workers: Option<usize>,
}

impl Default for StatisticsConfigBuilder {
    fn default() -> Self {
        Self {
            spanning_cluster: false,
            coords: None,
            axis: 0,
            margin: 0.05,
            runs: 40,
            ps: Vec::new(),
            seed: None,
            num_workers: None,
        }
    }
}

impl StatisticsConfigBuilder {
    /// Creates a builder populated with the default parameters
    /// (`runs = 40`, `margin = 0.05`, `axis = 0`, `spanning_cluster = false`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target occupation probabilities.
    #[must_use]
    pub fn with_ps(mut self, ps: Vec<f64>) -> Self {
        self.ps = ps;
        self
    }

    /// Sets the ensemble run count.
    #[must_use]
    pub fn with_runs(mut self, runs: u32) -> Self {
        self.runs = runs;
        self
    }

    /// Enables or disables spanning-cluster detection.
    #[must_use]
    pub fn with_spanning_cluster(mut self, enabled: bool) -> Self {
        self.spanning_cluster = enabled;
        self
    }

    /// Supplies node coordinates (required when spanning detection is
    /// enabled).
    #[must_use]
    pub fn with_coords(mut self, coords: Coords) -> Self {
        self.coords = Some(coords);
        self
    }

    /// Sets the axis along which boundary nodes are selected.
    #[must_use]
    pub fn with_axis(mut self, axis: usize) -> Self {
        self.axis = axis;
        self
    }

    /// Sets the boundary margin fraction.
    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Sets the base RNG seed used to derive per-realization sub-seeds.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Overrides the `rayon` worker count used to dispatch realizations,
    /// instead of the global `rayon` pool.
    #[must_use]
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = Some(num_workers);
        self
    }

    /// Validates every configuration constraint and constructs a
    /// [`StatisticsConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`PercolationError::ConfigZeroRuns`] if `runs == 0`,
    /// [`PercolationError::ConfigProbabilityOutOfRange`] if any entry of
    /// `ps` is outside `[0, 1]`, [`PercolationError::ConfigMissingCoords`]
    /// if spanning detection is requested without coordinates, or
    /// [`PercolationError::ConfigAxisOutOfRange`] /
    /// [`PercolationError::ConfigMarginOutOfRange`] for an invalid axis or
    /// margin.
    pub fn build(self) -> Result<StatisticsConfig> {
        if self.runs == 0 {
            return Err(PercolationError::ConfigZeroRuns { runs: self.runs });
        }
        for (index, &value) in self.ps.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) {
                return Err(PercolationError::ConfigProbabilityOutOfRange {
                    index,
                    value,
                });
            }
        }
        if self.spanning_cluster {
            let coords = self
                .coords
                .as_ref()
                .ok_or(PercolationError::ConfigMissingCoords)?;
            if self.axis >= coords.dims() {
                return Err(PercolationError::ConfigAxisOutOfRange {
                    axis: self.axis,
                    dims: coords.dims(),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.margin) {
            return Err(PercolationError::ConfigMarginOutOfRange {
                margin: self.margin,
            });
        }

        Ok(StatisticsConfig {
            spanning_cluster: self.spanning_cluster,
            coords: self.coords,
            axis: self.axis,
            margin: self.margin,
            runs: self.runs,
            ps: self.ps,
            seed: self.seed,
            num_workers: self.num_workers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_build_without_coords() {
        let config = StatisticsConfigBuilder::new().build().expect("defaults are valid");
        assert_eq!(config.runs(), 40);
        assert!(!config.spanning_cluster());
    }

    #[test]
    fn zero_runs_is_rejected() {
        let err = StatisticsConfigBuilder::new()
            .with_runs(0)
            .build()
            .unwrap_err();
        assert_eq!(err, PercolationError::ConfigZeroRuns { runs: 0 });
    }

    #[rstest]
    #[case::below_zero(-0.1)]
    #[case::above_one(1.2)]
    fn out_of_range_probability_is_rejected(#[case] bad: f64) {
        let err = StatisticsConfigBuilder::new()
            .with_ps(vec![0.2, bad])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            PercolationError::ConfigProbabilityOutOfRange { index: 1, value: bad }
        );
    }

    #[test]
    fn spanning_without_coords_is_rejected() {
        let err = StatisticsConfigBuilder::new()
            .with_spanning_cluster(true)
            .build()
            .unwrap_err();
        assert_eq!(err, PercolationError::ConfigMissingCoords);
    }

    #[test]
    fn spanning_with_axis_out_of_range_is_rejected() {
        let coords = Coords::new(vec![0.0, 1.0, 2.0, 3.0], 1);
        let err = StatisticsConfigBuilder::new()
            .with_spanning_cluster(true)
            .with_coords(coords)
            .with_axis(1)
            .build()
            .unwrap_err();
        assert_eq!(err, PercolationError::ConfigAxisOutOfRange { axis: 1, dims: 1 });
    }

    #[test]
    fn margin_out_of_range_is_rejected() {
        let err = StatisticsConfigBuilder::new()
            .with_margin(1.5)
            .build()
            .unwrap_err();
        assert_eq!(err, PercolationError::ConfigMarginOutOfRange { margin: 1.5 });
    }
}
