//! # cs-summary
//!
//! Credible-interval summarization of posterior sample chains.
//!
//! This crate turns weighted 1-D samples into (lower, center, upper) bound
//! triples:
//! - density building: binning heuristics + Gaussian smoothing + optional KDE
//! - six interval strategies over the resulting density/cumulative curve
//! - a dispatcher that summarizes whole chains, in parallel where possible
//!
//! ## Architecture
//!
//! Kernel density estimation sits behind the `KdeEstimator` trait from
//! cs-core, so the interval strategies never depend on a concrete estimator.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bins;
pub mod chain;
pub mod density;
pub mod intervals;
pub mod kde;
pub mod math;
pub mod summary;

pub use chain::{Chain, SummaryConfig};
pub use density::{build_density, DensityCurve};
pub use intervals::{strategy_for, IntervalStrategy};
pub use kde::MegKde;
pub use summary::Summarizer;
