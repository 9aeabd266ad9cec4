//! Common data types for ChainSummary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which interval definition a chain uses for its 1-D marginal summaries.
///
/// Every variant consumes the same density/cumulative curve and a desired
/// credible mass; they differ in what "the interval" means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatistic {
    /// Highest-density region found by bisecting a density threshold.
    Max,
    /// Equal-tailed interval with the center reported as the midpoint of
    /// lower and upper.
    Mean,
    /// Equal-tailed interval with the median as center.
    Cumulative,
    /// Interval symmetric about the density mode.
    MaxSymmetric,
    /// Shortest interval containing the desired mass and the mode.
    MaxShortest,
    /// Equal-tailed interval with the density mode as center.
    MaxCentral,
}

impl Default for SummaryStatistic {
    fn default() -> Self {
        SummaryStatistic::Max
    }
}

/// A 1-D credible interval plus its representative point estimate.
///
/// `lower`/`upper` are both `None` when the parameter was judged
/// unconstrained — a failure outcome, distinct from a zero-width interval.
/// When all three are set, `lower <= center <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    /// Lower edge of the credible interval.
    pub lower: Option<f64>,
    /// Representative point estimate (mode, median, or midpoint depending on
    /// the statistic).
    pub center: Option<f64>,
    /// Upper edge of the credible interval.
    pub upper: Option<f64>,
}

impl Bound {
    /// Build a bound from candidate values, discarding non-finite candidates.
    ///
    /// Non-finite lower/upper candidates collapse to `None` so degenerate
    /// densities surface as "unconstrained" rather than as silently wrong
    /// numbers.
    pub fn new(lower: f64, center: f64, upper: f64) -> Self {
        Self {
            lower: finite(lower),
            center: finite(center),
            upper: finite(upper),
        }
    }

    /// An unconstrained outcome: no interval, optionally a point estimate.
    pub fn unconstrained(center: Option<f64>) -> Self {
        Self { lower: None, center: center.and_then(|c| finite(c)), upper: None }
    }

    /// True when no interval could be established.
    pub fn is_unconstrained(&self) -> bool {
        self.lower.is_none() || self.upper.is_none()
    }

    /// Interval width, when both edges exist.
    pub fn width(&self) -> Option<f64> {
        Some(self.upper? - self.lower?)
    }
}

fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

/// The sample with the highest log-posterior value in a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxPosterior {
    /// Log-posterior value at the maximum.
    pub log_posterior: f64,
    /// Parameter coordinate of the maximum, keyed by column name.
    pub coordinate: BTreeMap<String, f64>,
}
