//! Newman-Ziff microcanonical and canonical bond-percolation engine.
//!
//! Edges are added one at a time in a chosen order over a weighted
//! union-find; after each addition the engine reports the largest
//! component size and, if a pair of boundary sentinel vertices was wired
//! in, whether they are now connected ("spanning"). [`compute_percolation_single`]
//! exposes one realization directly; [`compute_percolation_statistics`]
//! runs an ensemble of random-order realizations and convolves the
//! aggregated moments against a Binomial occupation-probability PMF to
//! produce canonical-ensemble curves with confidence intervals.

mod boundary;
mod config;
mod edges;
mod ensemble;
mod error;
mod runner;
mod stats;
mod union_find;

pub use crate::{
    boundary::BoundarySetup,
    config::{Coords, StatisticsConfig, StatisticsConfigBuilder},
    edges::edges_from_flat,
    ensemble::{SingleRunOutput, StatisticsOutput, compute_percolation_single, compute_percolation_statistics},
    error::{PercolationError, PercolationErrorCode, Result},
    runner::{NO_SENTINEL, PercolationTrace, run_percolation},
};
