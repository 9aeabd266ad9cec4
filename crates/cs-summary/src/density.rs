//! Density curve construction.
//!
//! Pipeline: weighted histogram over heuristic bins → optional power
//! transform → optional Gaussian smoothing or KDE → linear interpolation
//! onto a fine evaluation grid → normalized cumulative curve.

use cs_core::{KdeEstimator, Result};

use crate::bins::{grid_edges, smoothed_edges, weighted_histogram_density};
use crate::chain::Chain;
use crate::math::{gaussian_filter_reflect, interp_linear, linspace, simpson};

/// Number of points on the fine evaluation grid.
pub const EVAL_POINTS: usize = 10_000;
/// Minimum number of KDE evaluation points.
const KDE_MIN_POINTS: usize = 200;

/// A 1-D density estimate on a fine grid, with its normalized cumulative
/// curve.
///
/// Invariants: `xs` strictly increasing, all three vectors equal length,
/// `cs` non-decreasing from ~0 to 1 (identically zero only for degenerate
/// input, which [`DensityCurve::is_degenerate`] reports).
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    /// Ordered query points.
    pub xs: Vec<f64>,
    /// Density values at `xs`.
    pub ys: Vec<f64>,
    /// Cumulative sum of `ys`, normalized to end at 1.
    pub cs: Vec<f64>,
}

impl DensityCurve {
    /// Index of the maximum density value (first occurrence).
    pub fn mode_index(&self) -> usize {
        self.ys
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// x-position of the density mode.
    pub fn mode(&self) -> f64 {
        self.xs[self.mode_index()]
    }

    /// Maximum density value.
    pub fn max_density(&self) -> f64 {
        self.ys[self.mode_index()]
    }

    /// True when the curve carries no usable mass (all-zero or non-finite
    /// density); strategies report such curves as unconstrained.
    pub fn is_degenerate(&self) -> bool {
        let peak = self.max_density();
        !(peak.is_finite() && peak > 0.0)
            || self.cs.last().map_or(true, |&c| !(c > 0.0))
    }
}

/// Build the density and cumulative curve for one column of a chain.
pub fn build_density(chain: &Chain, column: &str, kde: &dyn KdeEstimator) -> Result<DensityCurve> {
    build_density_padded(chain, column, kde, false)
}

/// As [`build_density`], with `pad` widening the binned range so a smoothing
/// kernel does not truncate mass at the data edges.
pub fn build_density_padded(
    chain: &Chain,
    column: &str,
    kde: &dyn KdeEstimator,
    pad: bool,
) -> Result<DensityCurve> {
    let data = chain.data(column)?;
    let weights = chain.weights();
    let cfg = chain.effective_config();

    let edges = if chain.is_grid() {
        grid_edges(data)?
    } else {
        smoothed_edges(cfg.smooth, cfg.bins, data, weights, pad)?
    };

    let mut hist = weighted_histogram_density(data, weights, &edges)?;
    if let Some(p) = chain.power() {
        // Combines independent chains' densities multiplicatively without
        // renormalizing first.
        for h in &mut hist {
            *h = h.powf(p);
        }
    }

    let centers: Vec<f64> = edges.windows(2).map(|e| 0.5 * (e[0] + e[1])).collect();
    let xs = linspace(centers[0], centers[centers.len() - 1], EVAL_POINTS);

    if cfg.smooth > 0 {
        hist = gaussian_filter_reflect(&hist, cfg.smooth as f64);
    }

    let ys: Vec<f64> = if let Some(factor) = cfg.kde {
        let n_kde = KDE_MIN_POINTS.max(edges.len() - 1);
        let kde_xs = linspace(centers[0], centers[centers.len() - 1], n_kde);
        let dx = (kde_xs[n_kde - 1] - kde_xs[0]) / (n_kde - 1) as f64;
        let mut kde_ys = kde.evaluate(data, weights, factor, &kde_xs)?;
        let area = simpson(&kde_ys, dx);
        if area.is_finite() && area > 0.0 {
            for y in &mut kde_ys {
                *y /= area;
            }
        }
        xs.iter().map(|&x| interp_linear(&kde_xs, &kde_ys, x)).collect()
    } else {
        xs.iter().map(|&x| interp_linear(&centers, &hist, x)).collect()
    };

    let mut cs = Vec::with_capacity(ys.len());
    let mut acc = 0.0;
    for &y in &ys {
        acc += y;
        cs.push(acc);
    }
    if acc.is_finite() && acc > 0.0 {
        for c in &mut cs {
            *c /= acc;
        }
    }

    Ok(DensityCurve { xs, ys, cs })
}
