//! Ensemble orchestration and the canonical-ensemble convolution.
//!
//! Houses the two public entry points: [`compute_percolation_single`] runs
//! one realization in the edges' given order; [`compute_percolation_statistics`]
//! dispatches `R` independent random-order realizations (via `rayon` when
//! the `parallel` feature is enabled, falling back to a sequential loop
//! otherwise) and convolves the aggregated microcanonical moments against a
//! Binomial PMF per target probability.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::instrument;

use crate::boundary::{self, BoundarySetup};
use crate::config::{Coords, StatisticsConfig};
use crate::edges::{self, ValidatedEdges};
use crate::error::{PercolationError, Result};
use crate::runner::{self, PercolationTrace};
use crate::stats;

/// SplitMix64 increment (the 64-bit golden ratio), used for per-run seed
/// derivation: each run index maps to an independent sub-seed so
/// reproducibility does not depend on how `rayon` schedules work across
/// threads.
const RUN_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(RUN_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}

fn derive_run_seed(base_seed: u64, run_index: u32) -> u64 {
    splitmix64(base_seed ^ ((u64::from(run_index) + 1).wrapping_mul(RUN_SEED_SPACING)))
}

/// Output of a single-realization run.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleRunOutput {
    /// Largest component size after each of the `M` main edges is added.
    pub max_cluster_size: Vec<f64>,
    /// Spanning flag after each of the `M` main edges is added.
    pub spanning: Vec<u8>,
    /// The inferred node count `N`.
    pub node_count: usize,
    /// The main edge count `M`.
    pub edge_count: usize,
}

/// Output of an ensemble run across `ps`.
#[derive(Clone, Debug, PartialEq)]
pub struct StatisticsOutput {
    /// The target occupation probabilities the caller supplied.
    pub ps: Vec<f64>,
    /// The inferred node count `N`.
    pub node_count: usize,
    /// The main edge count `M`.
    pub edge_count: usize,
    /// Canonical largest-component-size estimate per probability, as a
    /// fraction of `node_count`.
    pub max_cluster_size: Vec<f64>,
    /// `[lo, hi]` confidence bounds, parallel to `max_cluster_size`.
    pub max_cluster_size_ci: Vec<[f64; 2]>,
    /// Canonical spanning-probability estimate per probability (zero-filled
    /// when spanning detection is disabled).
    pub spanning_cluster: Vec<f64>,
    /// `[lo, hi]` credible bounds, parallel to `spanning_cluster`.
    pub spanning_cluster_ci: Vec<[f64; 2]>,
}

struct PreparedGraph {
    validated: ValidatedEdges,
    boundary: Option<BoundarySetup>,
}

#[instrument(skip(edges, coords), fields(spanning_cluster, axis, margin))]
fn prepare_graph(
    edges: &[[i64; 2]],
    spanning_cluster: bool,
    coords: Option<&Coords>,
    axis: usize,
    margin: f64,
) -> Result<PreparedGraph> {
    if spanning_cluster && coords.is_none() {
        return Err(PercolationError::ConfigMissingCoords);
    }

    let coords_rows = coords.map(Coords::node_count);
    let validated = edges::prepare_edges(edges, coords_rows)?;

    let boundary = match coords {
        Some(coords) if spanning_cluster => {
            Some(boundary::select_boundary(coords.as_flat(), coords.dims(), axis, margin)?)
        }
        _ => None,
    };

    Ok(PreparedGraph { validated, boundary })
}

fn assemble_arrays(graph: &PreparedGraph) -> (Vec<i64>, Vec<i64>) {
    let boundary_len = graph.boundary.as_ref().map_or(0, BoundarySetup::len);
    let total = boundary_len + graph.validated.u.len();
    let mut u = Vec::with_capacity(total);
    let mut v = Vec::with_capacity(total);
    if let Some(boundary) = &graph.boundary {
        for &(a, b) in &boundary.boundary_edges {
            u.push(a as i64);
            v.push(b as i64);
        }
    }
    u.extend_from_slice(&graph.validated.u);
    v.extend_from_slice(&graph.validated.v);
    (u, v)
}

fn total_nodes(graph: &PreparedGraph) -> usize {
    graph.validated.node_count + if graph.boundary.is_some() { 2 } else { 0 }
}

fn sentinel_pair(graph: &PreparedGraph) -> (i64, i64) {
    graph
        .boundary
        .as_ref()
        .map_or((runner::NO_SENTINEL, runner::NO_SENTINEL), |b| {
            (b.aux_0 as i64, b.aux_1 as i64)
        })
}

fn run_trace(graph: &PreparedGraph, order: &[usize]) -> PercolationTrace {
    let (u, v) = assemble_arrays(graph);
    let (aux_0, aux_1) = sentinel_pair(graph);
    runner::run_percolation(graph.validated.node_count, total_nodes(graph), &u, &v, order, aux_0, aux_1)
}

/// Runs a single microcanonical percolation realization in the edges'
/// given order, without reshuffling.
///
/// # Errors
///
/// Returns [`PercolationError::ConfigMissingCoords`] if `spanning_cluster`
/// is requested without `coords`, or a `Config*`/`Shape*` error from
/// boundary selection or edge validation.
#[instrument(skip(edges, coords), fields(spanning_cluster, axis, margin), err)]
pub fn compute_percolation_single(
    edges: &[[i64; 2]],
    spanning_cluster: bool,
    coords: Option<&Coords>,
    axis: usize,
    margin: f64,
) -> Result<SingleRunOutput> {
    let graph = prepare_graph(edges, spanning_cluster, coords, axis, margin)?;
    let boundary_len = graph.boundary.as_ref().map_or(0, BoundarySetup::len);
    let main_len = graph.validated.u.len();
    let order: Vec<usize> = (0..boundary_len + main_len).collect();
    let trace = run_trace(&graph, &order);

    Ok(SingleRunOutput {
        max_cluster_size: trace.max_cluster_size[boundary_len..]
            .iter()
            .map(|&size| size as f64)
            .collect(),
        spanning: trace.spanning[boundary_len..]
            .iter()
            .map(|&flag| u8::from(flag))
            .collect(),
        node_count: graph.validated.node_count,
        edge_count: main_len,
    })
}

fn build_order(boundary_len: usize, main_len: usize, rng: &mut SmallRng) -> Vec<usize> {
    let mut main_indices: Vec<usize> = (boundary_len..boundary_len + main_len).collect();
    main_indices.shuffle(rng);
    let mut order: Vec<usize> = (0..boundary_len).collect();
    order.extend(main_indices);
    order
}

struct Baseline {
    max: f64,
    span: u8,
}

fn compute_baseline(graph: &PreparedGraph) -> Baseline {
    let node_count = graph.validated.node_count;
    let boundary_len = graph.boundary.as_ref().map_or(0, BoundarySetup::len);
    let (raw_max, span) = if boundary_len == 0 {
        (1.0, 0)
    } else {
        let order: Vec<usize> = (0..boundary_len).collect();
        let trace = run_trace(graph, &order);
        (
            trace.max_cluster_size[boundary_len - 1] as f64,
            u8::from(trace.spanning[boundary_len - 1]),
        )
    };
    let max = if node_count == 0 { raw_max } else { raw_max / node_count as f64 };
    Baseline { max, span }
}

struct Realization {
    max_cluster_size: Vec<f64>,
    spanning: Vec<u8>,
}

fn realize(graph: &PreparedGraph, boundary_len: usize, main_len: usize, seed: u64) -> Realization {
    let mut rng = SmallRng::seed_from_u64(seed);
    let order = build_order(boundary_len, main_len, &mut rng);
    let trace = run_trace(graph, &order);
    Realization {
        max_cluster_size: trace.max_cluster_size[boundary_len..]
            .iter()
            .map(|&size| size as f64)
            .collect(),
        spanning: trace.spanning[boundary_len..]
            .iter()
            .map(|&flag| u8::from(flag))
            .collect(),
    }
}

#[cfg(feature = "parallel")]
fn realize_all(
    graph: &PreparedGraph,
    boundary_len: usize,
    main_len: usize,
    runs: u32,
    base_seed: u64,
    num_workers: Option<usize>,
) -> Vec<Realization> {
    use rayon::prelude::*;

    let dispatch = |pool: Option<&rayon::ThreadPool>| {
        let build = || {
            (0..runs)
                .into_par_iter()
                .map(|run_index| {
                    let seed = derive_run_seed(base_seed, run_index);
                    realize(graph, boundary_len, main_len, seed)
                })
                .collect()
        };
        pool.map_or_else(build, |pool| pool.install(build))
    };

    match num_workers {
        Some(workers) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .expect("thread pool with a caller-chosen worker count");
            dispatch(Some(&pool))
        }
        None => dispatch(None),
    }
}

#[cfg(not(feature = "parallel"))]
fn realize_all(
    graph: &PreparedGraph,
    boundary_len: usize,
    main_len: usize,
    runs: u32,
    base_seed: u64,
    _num_workers: Option<usize>,
) -> Vec<Realization> {
    (0..runs)
        .map(|run_index| {
            let seed = derive_run_seed(base_seed, run_index);
            realize(graph, boundary_len, main_len, seed)
        })
        .collect()
}

struct MicrocanonicalMoments {
    mean_max: Vec<f64>,
    stderr_max: Vec<f64>,
    mean_span: Vec<f64>,
    span_ci: Vec<(f64, f64)>,
}

fn aggregate(
    realizations: &[Realization],
    node_count: usize,
    main_len: usize,
    runs: u32,
) -> MicrocanonicalMoments {
    let r = realizations.len();
    let norm = if node_count == 0 { 1.0 } else { node_count as f64 };
    let mut mean_max = vec![0.0; main_len];
    let mut stderr_max = vec![0.0; main_len];
    let mut mean_span = vec![0.0; main_len];
    let mut span_ci = vec![(0.0, 0.0); main_len];

    for t in 0..main_len {
        let values: Vec<f64> = realizations.iter().map(|run| run.max_cluster_size[t]).collect();
        let mean = values.iter().sum::<f64>() / r as f64;
        let variance = if r > 1 {
            values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (r - 1) as f64
        } else {
            0.0
        };
        mean_max[t] = mean / norm;
        stderr_max[t] = variance.sqrt() / (r as f64).sqrt() / norm;

        let successes = u32::try_from(
            realizations.iter().filter(|run| run.spanning[t] != 0).count(),
        )
        .expect("successes never exceed runs");
        mean_span[t] = stats::laplace_mean(successes, runs);
        span_ci[t] = stats::spanning_credible_interval(successes, runs);
    }

    MicrocanonicalMoments {
        mean_max,
        stderr_max,
        mean_span,
        span_ci,
    }
}

/// Runs the ensemble and convolves the aggregated microcanonical moments
/// against a Binomial PMF for every configured probability.
///
/// # Errors
///
/// Returns a `Config*`/`Shape*` error from edge validation or boundary
/// selection; the configuration's own invariants were already checked by
/// [`crate::config::StatisticsConfigBuilder::build`].
#[instrument(skip(edges, config), fields(runs = config.runs, spanning_cluster = config.spanning_cluster), err)]
pub fn compute_percolation_statistics(
    edges: &[[i64; 2]],
    config: &StatisticsConfig,
) -> Result<StatisticsOutput> {
    let graph = prepare_graph(
        edges,
        config.spanning_cluster,
        config.coords.as_ref(),
        config.axis,
        config.margin,
    )?;
    let boundary_len = graph.boundary.as_ref().map_or(0, BoundarySetup::len);
    let main_len = graph.validated.u.len();
    let baseline = compute_baseline(&graph);

    let base_seed = config.seed.unwrap_or_else(|| rand::random::<u64>());
    let realizations = realize_all(
        &graph,
        boundary_len,
        main_len,
        config.runs,
        base_seed,
        config.num_workers,
    );
    let moments = aggregate(&realizations, graph.validated.node_count, main_len, config.runs);

    let mut max_cluster_size = Vec::with_capacity(config.ps.len());
    let mut max_cluster_size_ci = Vec::with_capacity(config.ps.len());
    let mut spanning_cluster = Vec::with_capacity(config.ps.len());
    let mut spanning_cluster_ci = Vec::with_capacity(config.ps.len());

    for &p in &config.ps {
        let pmf = stats::binomial_pmf_table(main_len as u64, p);
        max_cluster_size.push(stats::convolve(&pmf, baseline.max, &moments.mean_max));

        let lower: Vec<f64> = moments
            .mean_max
            .iter()
            .zip(&moments.stderr_max)
            .map(|(&mean, &stderr)| mean - stderr)
            .collect();
        let upper: Vec<f64> = moments
            .mean_max
            .iter()
            .zip(&moments.stderr_max)
            .map(|(&mean, &stderr)| mean + stderr)
            .collect();
        max_cluster_size_ci.push([
            stats::convolve(&pmf, baseline.max, &lower),
            stats::convolve(&pmf, baseline.max, &upper),
        ]);

        if config.spanning_cluster {
            spanning_cluster.push(stats::convolve(&pmf, f64::from(baseline.span), &moments.mean_span));
            let lo: Vec<f64> = moments.span_ci.iter().map(|&(lo, _)| lo).collect();
            let hi: Vec<f64> = moments.span_ci.iter().map(|&(_, hi)| hi).collect();
            spanning_cluster_ci.push([
                stats::convolve(&pmf, 0.0, &lo),
                stats::convolve(&pmf, 0.0, &hi),
            ]);
        } else {
            spanning_cluster.push(0.0);
            spanning_cluster_ci.push([0.0, 0.0]);
        }
    }

    Ok(StatisticsOutput {
        ps: config.ps.clone(),
        node_count: graph.validated.node_count,
        edge_count: main_len,
        max_cluster_size,
        max_cluster_size_ci,
        spanning_cluster,
        spanning_cluster_ci,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatisticsConfigBuilder;

    #[test]
    fn single_run_matches_triangle_fixed_order() {
        let edges = [[0, 1], [1, 2], [0, 2]];
        let result = compute_percolation_single(&edges, false, None, 0, 0.05).expect("valid run");
        assert_eq!(result.max_cluster_size, vec![2.0, 3.0, 3.0]);
        assert_eq!(result.spanning, vec![0, 0, 0]);
        assert_eq!(result.node_count, 3);
    }

    #[test]
    fn single_run_empty_graph_needs_no_coords_and_infers_zero_nodes() {
        let result = compute_percolation_single(&[], false, None, 0, 0.05).expect("valid run");
        assert!(result.max_cluster_size.is_empty());
        assert_eq!(result.node_count, 0);
    }

    #[test]
    fn spanning_without_coords_is_an_error() {
        let edges = [[0, 1]];
        let err = compute_percolation_single(&edges, true, None, 0, 0.05).unwrap_err();
        assert_eq!(err, PercolationError::ConfigMissingCoords);
    }

    #[test]
    fn run_seeds_are_deterministic_given_base_seed_and_index() {
        let a = derive_run_seed(42, 3);
        let b = derive_run_seed(42, 3);
        let c = derive_run_seed(42, 4);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn statistics_with_single_run_has_zero_stderr() {
        let edges = [[0, 1], [1, 2], [2, 3]];
        let config = StatisticsConfigBuilder::new()
            .with_ps(vec![0.5])
            .with_runs(1)
            .with_seed(7)
            .build()
            .expect("valid config");
        let output = compute_percolation_statistics(&edges, &config).expect("valid run");
        let [lo, hi] = output.max_cluster_size_ci[0];
        assert!((hi - lo).abs() < 1e-9);
    }

    #[test]
    fn statistics_ci_bounds_are_ordered() {
        let edges = [[0, 1], [1, 2], [2, 3], [3, 4]];
        let config = StatisticsConfigBuilder::new()
            .with_ps(vec![0.1, 0.5, 0.9])
            .with_runs(8)
            .with_seed(11)
            .build()
            .expect("valid config");
        let output = compute_percolation_statistics(&edges, &config).expect("valid run");
        for [lo, hi] in &output.max_cluster_size_ci {
            assert!(lo <= hi);
        }
    }

    #[test]
    fn statistics_spanning_is_zero_filled_when_disabled() {
        let edges = [[0, 1], [1, 2]];
        let config = StatisticsConfigBuilder::new()
            .with_ps(vec![0.3])
            .with_runs(4)
            .with_seed(3)
            .build()
            .expect("valid config");
        let output = compute_percolation_statistics(&edges, &config).expect("valid run");
        assert_eq!(output.spanning_cluster, vec![0.0]);
        assert_eq!(output.spanning_cluster_ci, vec![[0.0, 0.0]]);
    }
}
