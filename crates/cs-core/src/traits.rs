//! Core traits for ChainSummary
//!
//! Capability seams keep the summarization engine independent of concrete
//! numeric collaborators: the interval strategies never see how a density
//! estimate was produced.

use crate::Result;

/// Weighted 1-D kernel density evaluator.
///
/// Implementations return *unnormalized* density values at the query points;
/// the density builder normalizes the integral itself and never relies on an
/// estimator's own normalization.
pub trait KdeEstimator: Send + Sync {
    /// Evaluate the density of `data` (paired 1:1 with `weights`) at `xs`.
    ///
    /// `factor` scales the estimator's bandwidth; larger values smooth more.
    fn evaluate(&self, data: &[f64], weights: &[f64], factor: f64, xs: &[f64])
        -> Result<Vec<f64>>;

    /// Estimator name (for diagnostics).
    fn name(&self) -> &str;
}
