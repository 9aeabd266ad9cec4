//! Binning heuristics for weighted samples.
//!
//! Three policies feed the density builder:
//! - extent trimming: cut tails below a tiny cumulative mass so a handful of
//!   outliers cannot stretch the histogram range,
//! - smoothed bins: multiply the bin count so the requested Gaussian scale
//!   stays resolvable, optionally padding the range for kernel headroom,
//! - grid bins: infer edges from the unique values of grid-aligned samples.

use cs_core::{Error, Result};

use crate::math::linspace;

const EXTENT_BINS: usize = 2000;
const EXTENT_TAIL_MASS: f64 = 1e-5;
const PAD_FRACTION: f64 = 0.2;

/// Raw weight sums per bin. The final bin is right-inclusive.
pub fn weighted_counts(data: &[f64], weights: &[f64], edges: &[f64]) -> Vec<f64> {
    let n_bins = edges.len().saturating_sub(1);
    let mut counts = vec![0.0; n_bins];
    if n_bins == 0 {
        return counts;
    }
    let (lo, hi) = (edges[0], edges[n_bins]);
    for (&x, &w) in data.iter().zip(weights) {
        if !x.is_finite() || x < lo || x > hi {
            continue;
        }
        let i = edges.partition_point(|&e| e <= x);
        let idx = i.saturating_sub(1).min(n_bins - 1);
        counts[idx] += w;
    }
    counts
}

/// Weighted histogram normalized to unit integral over the binned range.
pub fn weighted_histogram_density(
    data: &[f64],
    weights: &[f64],
    edges: &[f64],
) -> Result<Vec<f64>> {
    if edges.len() < 2 {
        return Err(Error::Validation("histogram requires at least two bin edges".to_string()));
    }
    let counts = weighted_counts(data, weights, edges);
    let total: f64 = counts.iter().sum();
    if !(total > 0.0) {
        // No in-range mass: a flat zero curve the strategies must detect.
        return Ok(counts);
    }
    Ok(counts
        .iter()
        .zip(edges.windows(2))
        .map(|(&c, e)| {
            let width = e[1] - e[0];
            if width > 0.0 { c / (total * width) } else { 0.0 }
        })
        .collect())
}

/// Data range trimmed to the mass inside `[tail, 1 - tail]` of the weighted
/// CDF, so stray outliers do not dominate the binning.
///
/// `pad` widens the result by 20% of the trimmed width per side, giving a
/// smoothing kernel headroom beyond the data edges.
pub fn get_extents(data: &[f64], weights: &[f64], pad: bool) -> Result<(f64, f64)> {
    if data.is_empty() {
        return Err(Error::Validation("cannot compute extents of an empty sample".to_string()));
    }
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &x in data {
        if x.is_finite() {
            lo = lo.min(x);
            hi = hi.max(x);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        return Err(Error::Validation("sample contains no finite values".to_string()));
    }
    if !(hi > lo) {
        // Zero spread: widen so histogramming stays well defined downstream.
        let eps = lo.abs().max(1.0) * 1e-7;
        return Ok((lo - eps, hi + eps));
    }

    let edges = linspace(lo, hi, EXTENT_BINS + 1);
    let counts = weighted_counts(data, weights, &edges);
    let total: f64 = counts.iter().sum();
    if !(total > 0.0) {
        return Ok((lo, hi));
    }
    let centers: Vec<f64> = edges.windows(2).map(|e| 0.5 * (e[0] + e[1])).collect();
    let mut acc = 0.0;
    let cdf: Vec<f64> = counts
        .iter()
        .map(|&c| {
            acc += c;
            acc / total
        })
        .collect();

    let i1 = cdf.iter().position(|&c| c > EXTENT_TAIL_MASS).unwrap_or(0);
    let i2 = cdf
        .iter()
        .position(|&c| c >= 1.0 - EXTENT_TAIL_MASS)
        .unwrap_or(centers.len() - 1);
    let (i1, i2) = (i1.min(i2), i1.max(i2));
    let (mut lower, mut upper) = if i1 == i2 {
        // The trimmed mass sits inside a single coarse bin; its edges are
        // the tightest range that still encloses it.
        (edges[i1], edges[i1 + 1])
    } else {
        (centers[i1], centers[i2])
    };
    if pad {
        let width = upper - lower;
        lower -= PAD_FRACTION * width;
        upper += PAD_FRACTION * width;
    }
    Ok((lower, upper))
}

/// Bin edges for a free-form sample: `bins` bins over the trimmed extents,
/// multiplied by `2 * smooth` when Gaussian smoothing is requested so the
/// smoothing scale stays resolvable.
pub fn smoothed_edges(
    smooth: usize,
    bins: usize,
    data: &[f64],
    weights: &[f64],
    pad: bool,
) -> Result<Vec<f64>> {
    let (lo, hi) = get_extents(data, weights, pad)?;
    let n_bins = if smooth > 0 { 2 * smooth * bins } else { bins };
    Ok(linspace(lo, hi, n_bins.max(2) + 1))
}

/// Bin edges for grid-aligned samples: midpoints between the unique sorted
/// values, extended by half a grid step at both ends.
pub fn grid_edges(data: &[f64]) -> Result<Vec<f64>> {
    let mut vals: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    vals.sort_by(f64::total_cmp);
    vals.dedup();
    if vals.len() < 2 {
        return Err(Error::Validation(
            "grid chains need at least two distinct sample values".to_string(),
        ));
    }
    let delta = 0.5 * (vals[1] - vals[0]);
    let mut edges: Vec<f64> = vals.iter().map(|v| v - delta).collect();
    edges.push(vals[vals.len() - 1] + delta);
    Ok(edges)
}
