//! The six interval strategies.
//!
//! All strategies consume the same [`DensityCurve`] and desired credible
//! mass and produce a [`Bound`]. They are pure: failure to converge is a
//! typed "unconstrained" outcome, never a panic or a sentinel value.

use cs_core::{Bound, SummaryStatistic};

use crate::density::DensityCurve;
use crate::math::{interp_inverse_unbounded, interp_linear, linspace};

/// Bisection budget shared by the threshold and symmetric searches.
const MAX_ITERATIONS: usize = 50;
/// Mass tolerance for the threshold bisection.
const MAX_MASS_TOLERANCE: f64 = 0.003;
/// Mass tolerance for the symmetric half-width search.
const SYMMETRIC_MASS_TOLERANCE: f64 = 1e-4;
/// Number of zero-density ramp points padded onto each end for the
/// threshold search.
const RAMP_POINTS: usize = 1000;

/// One definition of "credible interval" over a density/cumulative curve.
pub trait IntervalStrategy: Send + Sync {
    /// Strategy name (for diagnostics).
    fn name(&self) -> &'static str;

    /// Estimate (lower, center, upper) bounds enclosing `desired_mass`.
    fn estimate(&self, curve: &DensityCurve, desired_mass: f64) -> Bound;
}

/// Equal-tailed interval; center is the median.
pub struct Cumulative;
/// Equal-tailed interval; center is the midpoint of lower and upper.
pub struct Mean;
/// Highest-density region via density-threshold bisection.
pub struct MaxDensity;
/// Interval symmetric about the density mode.
pub struct MaxSymmetric;
/// Shortest interval containing the desired mass and the mode.
pub struct MaxShortest;
/// Equal-tailed interval; center is the density mode.
pub struct MaxCentral;

static STRATEGIES: [(SummaryStatistic, &dyn IntervalStrategy); 6] = [
    (SummaryStatistic::Max, &MaxDensity),
    (SummaryStatistic::Mean, &Mean),
    (SummaryStatistic::Cumulative, &Cumulative),
    (SummaryStatistic::MaxSymmetric, &MaxSymmetric),
    (SummaryStatistic::MaxShortest, &MaxShortest),
    (SummaryStatistic::MaxCentral, &MaxCentral),
];

/// Look up the strategy registered for a statistic.
pub fn strategy_for(statistic: SummaryStatistic) -> &'static dyn IntervalStrategy {
    STRATEGIES
        .iter()
        .find(|(s, _)| *s == statistic)
        .map(|(_, strategy)| *strategy)
        // The table above covers the closed enum exhaustively.
        .expect("every SummaryStatistic has a registered strategy")
}

/// Invert the cumulative curve at the equal-tailed quantiles
/// `(0.5 - mass/2, 0.5, 0.5 + mass/2)`.
fn equal_tailed(curve: &DensityCurve, desired_mass: f64) -> (f64, f64, f64) {
    let lo = interp_linear(&curve.cs, &curve.xs, 0.5 - desired_mass / 2.0);
    let median = interp_linear(&curve.cs, &curve.xs, 0.5);
    let hi = interp_linear(&curve.cs, &curve.xs, 0.5 + desired_mass / 2.0);
    (lo, median, hi)
}

impl IntervalStrategy for Cumulative {
    fn name(&self) -> &'static str {
        "cumulative"
    }

    fn estimate(&self, curve: &DensityCurve, desired_mass: f64) -> Bound {
        if curve.is_degenerate() {
            return Bound::unconstrained(None);
        }
        let (lo, median, hi) = equal_tailed(curve, desired_mass);
        Bound::new(lo, median, hi)
    }
}

impl IntervalStrategy for Mean {
    fn name(&self) -> &'static str {
        "mean"
    }

    fn estimate(&self, curve: &DensityCurve, desired_mass: f64) -> Bound {
        if curve.is_degenerate() {
            return Bound::unconstrained(None);
        }
        let (lo, _, hi) = equal_tailed(curve, desired_mass);
        Bound::new(lo, 0.5 * (lo + hi), hi)
    }
}

impl IntervalStrategy for MaxCentral {
    fn name(&self) -> &'static str {
        "max_central"
    }

    fn estimate(&self, curve: &DensityCurve, desired_mass: f64) -> Bound {
        if curve.is_degenerate() {
            return Bound::unconstrained(None);
        }
        let (lo, _, hi) = equal_tailed(curve, desired_mass);
        Bound::new(lo, curve.mode(), hi)
    }
}

impl IntervalStrategy for MaxDensity {
    fn name(&self) -> &'static str {
        "max"
    }

    fn estimate(&self, curve: &DensityCurve, desired_mass: f64) -> Bound {
        if curve.is_degenerate() {
            return Bound::unconstrained(None);
        }

        // Pad both ends with zero-density ramps at constant x so the
        // outward scans always find a crossing below any positive threshold.
        let n = curve.xs.len();
        let mut xs = Vec::with_capacity(n + 2 * RAMP_POINTS);
        let mut ys = Vec::with_capacity(n + 2 * RAMP_POINTS);
        xs.extend(std::iter::repeat(curve.xs[0]).take(RAMP_POINTS));
        xs.extend_from_slice(&curve.xs);
        xs.extend(std::iter::repeat(curve.xs[n - 1]).take(RAMP_POINTS));
        ys.extend(linspace(0.0, curve.ys[0], RAMP_POINTS));
        ys.extend_from_slice(&curve.ys);
        ys.extend(linspace(curve.ys[n - 1], 0.0, RAMP_POINTS));

        let mut acc = 0.0;
        let mut cs: Vec<f64> = ys
            .iter()
            .map(|&y| {
                acc += y;
                acc
            })
            .collect();
        if acc > 0.0 {
            for c in &mut cs {
                *c /= acc;
            }
        }

        let peak_index = RAMP_POINTS + curve.mode_index();
        let peak = ys[peak_index];
        let mode = xs[peak_index];

        let mut min_val = 0.0;
        let mut max_val = peak;
        for _ in 0..MAX_ITERATIONS {
            let mid = 0.5 * (min_val + max_val);
            let left = (0..peak_index).rev().find(|&i| ys[i] < mid);
            let right = (peak_index..ys.len()).find(|&i| ys[i] < mid);
            match (left, right) {
                (Some(i1), Some(i2)) => {
                    let area = cs[i2] - cs[i1];
                    if (area - desired_mass).abs() < MAX_MASS_TOLERANCE {
                        return Bound::new(xs[i1], mode, xs[i2]);
                    }
                    if area < desired_mass {
                        max_val = mid;
                    } else {
                        min_val = mid;
                    }
                }
                // No crossing: the threshold sits below the whole curve on
                // one side, so the enclosed mass is too large.
                _ => min_val = mid,
            }
        }
        Bound::unconstrained(Some(mode))
    }
}

impl IntervalStrategy for MaxSymmetric {
    fn name(&self) -> &'static str {
        "max_symmetric"
    }

    fn estimate(&self, curve: &DensityCurve, desired_mass: f64) -> Bound {
        if curve.is_degenerate() {
            return Bound::unconstrained(None);
        }
        let mode = curve.mode();
        let n = curve.xs.len();
        let mass_at = |x: f64| interp_linear(&curve.xs, &curve.cs, x);

        // Damped secant search on the half-width.
        let mut h = 0.5 * (curve.xs[n - 1] - curve.xs[0]);
        let mut prev_h = 0.0;
        for _ in 0..MAX_ITERATIONS {
            let area = mass_at(mode + h) - mass_at(mode - h);
            if (area - desired_mass).abs() < SYMMETRIC_MASS_TOLERANCE {
                return Bound::new(mode - h, mode, mode + h);
            }
            let step = 0.5 * (prev_h - h).abs();
            prev_h = h;
            h += if area < desired_mass { step } else { -step };
        }
        Bound::unconstrained(Some(mode))
    }
}

impl IntervalStrategy for MaxShortest {
    fn name(&self) -> &'static str {
        "max_shortest"
    }

    fn estimate(&self, curve: &DensityCurve, desired_mass: f64) -> Bound {
        if curve.is_degenerate() {
            return Bound::unconstrained(None);
        }
        let mode = curve.mode();

        // Pair each lower bound with the x that is desired_mass further
        // along the cumulative curve; keep the narrowest pair bracketing
        // the mode.
        let mut best: Option<(f64, f64)> = None;
        for (i, &lower) in curve.xs.iter().enumerate() {
            let upper =
                interp_inverse_unbounded(&curve.cs, &curve.xs, curve.cs[i] + desired_mass);
            if lower > mode || upper < mode {
                continue;
            }
            let width = upper - lower;
            if !width.is_finite() {
                continue;
            }
            if best.map_or(true, |(bl, bu)| width < bu - bl) {
                best = Some((lower, upper));
            }
        }
        match best {
            Some((lower, upper)) => Bound::new(lower, mode, upper),
            None => Bound::unconstrained(Some(mode)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Triangular density on [0, 2] peaked at 1: simple, asymmetry-free,
    /// with an analytic CDF.
    fn triangle_curve(n: usize) -> DensityCurve {
        let xs = linspace(0.0, 2.0, n);
        let ys: Vec<f64> = xs.iter().map(|&x| if x <= 1.0 { x } else { 2.0 - x }).collect();
        let mut acc = 0.0;
        let mut cs: Vec<f64> = ys
            .iter()
            .map(|&y| {
                acc += y;
                acc
            })
            .collect();
        for c in &mut cs {
            *c /= acc;
        }
        DensityCurve { xs, ys, cs }
    }

    fn flat_zero_curve() -> DensityCurve {
        let xs = linspace(0.0, 1.0, 100);
        DensityCurve { xs: xs.clone(), ys: vec![0.0; 100], cs: vec![0.0; 100] }
    }

    fn mass_between(curve: &DensityCurve, lo: f64, hi: f64) -> f64 {
        interp_linear(&curve.xs, &curve.cs, hi) - interp_linear(&curve.xs, &curve.cs, lo)
    }

    #[test]
    fn test_strategy_table_is_exhaustive() {
        for stat in [
            SummaryStatistic::Max,
            SummaryStatistic::Mean,
            SummaryStatistic::Cumulative,
            SummaryStatistic::MaxSymmetric,
            SummaryStatistic::MaxShortest,
            SummaryStatistic::MaxCentral,
        ] {
            let s = strategy_for(stat);
            assert!(!s.name().is_empty());
        }
    }

    #[test]
    fn test_cumulative_median_center() {
        let curve = triangle_curve(10_001);
        let b = Cumulative.estimate(&curve, 0.6827);
        // Symmetric triangle: median = mode = 1.
        assert!((b.center.unwrap() - 1.0).abs() < 1e-3, "center={:?}", b.center);
        assert!(b.lower.unwrap() < 1.0 && b.upper.unwrap() > 1.0);
    }

    #[test]
    fn test_cumulative_mass_consistency() {
        let curve = triangle_curve(10_001);
        for mass in [0.3, 0.6827, 0.95] {
            let b = Cumulative.estimate(&curve, mass);
            let enclosed = mass_between(&curve, b.lower.unwrap(), b.upper.unwrap());
            assert!(
                (enclosed - mass).abs() < 1e-3,
                "mass {mass}: enclosed {enclosed}"
            );
        }
    }

    #[test]
    fn test_mean_center_is_midpoint() {
        let curve = triangle_curve(10_001);
        let b = Mean.estimate(&curve, 0.5);
        let mid = 0.5 * (b.lower.unwrap() + b.upper.unwrap());
        assert!((b.center.unwrap() - mid).abs() < 1e-12);
    }

    #[test]
    fn test_max_central_same_edges_different_center() {
        let xs = linspace(0.0, 3.0, 10_001);
        // Skewed density so mode != median.
        let ys: Vec<f64> = xs.iter().map(|&x| (-(x - 0.5).powi(2) / 0.08).exp() + 0.2).collect();
        let mut acc = 0.0;
        let mut cs: Vec<f64> = ys
            .iter()
            .map(|&y| {
                acc += y;
                acc
            })
            .collect();
        for c in &mut cs {
            *c /= acc;
        }
        let curve = DensityCurve { xs, ys, cs };

        let cum = Cumulative.estimate(&curve, 0.6827);
        let cen = MaxCentral.estimate(&curve, 0.6827);
        assert_eq!(cum.lower, cen.lower, "edges are shared by construction");
        assert_eq!(cum.upper, cen.upper);
        assert!(
            (cum.center.unwrap() - cen.center.unwrap()).abs() > 1e-3,
            "median and mode should differ on a skewed curve"
        );
        assert!((cen.center.unwrap() - 0.5).abs() < 0.02, "mode should be ~0.5");
    }

    #[test]
    fn test_max_density_encloses_mass_around_mode() {
        let curve = triangle_curve(10_001);
        let b = MaxDensity.estimate(&curve, 0.6827);
        assert!(!b.is_unconstrained());
        let (lo, hi) = (b.lower.unwrap(), b.upper.unwrap());
        assert!(lo < 1.0 && hi > 1.0);
        assert!((b.center.unwrap() - 1.0).abs() < 1e-3);
        let enclosed = mass_between(&curve, lo, hi);
        assert!((enclosed - 0.6827).abs() < 0.01, "enclosed={enclosed}");
    }

    #[test]
    fn test_max_symmetric_bounds_symmetric_about_mode() {
        let curve = triangle_curve(10_001);
        let b = MaxSymmetric.estimate(&curve, 0.6827);
        assert!(!b.is_unconstrained());
        let (lo, c, hi) = (b.lower.unwrap(), b.center.unwrap(), b.upper.unwrap());
        assert!(((c - lo) - (hi - c)).abs() < 1e-9, "half-widths must match");
        let enclosed = mass_between(&curve, lo, hi);
        assert!((enclosed - 0.6827).abs() < 2e-4, "enclosed={enclosed}");
    }

    #[test]
    fn test_max_shortest_is_narrowest_bracketing_interval() {
        let curve = triangle_curve(10_001);
        let b = MaxShortest.estimate(&curve, 0.5);
        assert!(!b.is_unconstrained());
        let width = b.width().unwrap();
        // Compare against the equal-tailed interval for the same mass.
        let eq = Cumulative.estimate(&curve, 0.5);
        assert!(width <= eq.width().unwrap() + 1e-6);
        assert!(b.lower.unwrap() <= 1.0 && b.upper.unwrap() >= 1.0);
    }

    #[test]
    fn test_ordering_holds_for_interval_strategies() {
        let curve = triangle_curve(10_001);
        for stat in [
            SummaryStatistic::Mean,
            SummaryStatistic::Cumulative,
            SummaryStatistic::MaxSymmetric,
            SummaryStatistic::MaxShortest,
            SummaryStatistic::MaxCentral,
        ] {
            let b = strategy_for(stat).estimate(&curve, 0.6827);
            let (lo, c, hi) = (b.lower.unwrap(), b.center.unwrap(), b.upper.unwrap());
            assert!(lo <= c && c <= hi, "{stat:?}: {lo} {c} {hi}");
            assert!(hi - lo > 0.0, "{stat:?} must have positive width");
        }
    }

    #[test]
    fn test_idempotence() {
        let curve = triangle_curve(10_001);
        for (_, strategy) in STRATEGIES.iter() {
            let a = strategy.estimate(&curve, 0.6827);
            let b = strategy.estimate(&curve, 0.6827);
            assert_eq!(a, b, "{} must be deterministic", strategy.name());
        }
    }

    #[test]
    fn test_monotonicity_in_desired_mass() {
        let curve = triangle_curve(10_001);
        for (_, strategy) in STRATEGIES.iter() {
            let narrow = strategy.estimate(&curve, 0.4);
            let wide = strategy.estimate(&curve, 0.8);
            let (Some(wn), Some(ww)) = (narrow.width(), wide.width()) else {
                panic!("{} unconstrained on a clean curve", strategy.name());
            };
            assert!(
                ww >= wn - 1e-9,
                "{}: width must not shrink with mass ({wn} -> {ww})",
                strategy.name()
            );
        }
    }

    #[test]
    fn test_degenerate_curve_is_unconstrained_everywhere() {
        let curve = flat_zero_curve();
        for (_, strategy) in STRATEGIES.iter() {
            let b = strategy.estimate(&curve, 0.6827);
            assert!(b.is_unconstrained(), "{} must report unconstrained", strategy.name());
        }
    }

    #[test]
    fn test_max_density_spike_returns_peak() {
        // Single-spike density: peak must be reported even when no sensible
        // interval exists.
        let xs = linspace(0.0, 1.0, 1000);
        let mut ys = vec![0.0; 1000];
        ys[500] = 1.0;
        let mut cs = vec![0.0; 1000];
        for c in cs.iter_mut().skip(500) {
            *c = 1.0;
        }
        let curve = DensityCurve { xs, ys, cs };
        let b = MaxDensity.estimate(&curve, 0.6827);
        assert!((b.center.unwrap() - curve.mode()).abs() < 1e-12);
        // Either a degenerate interval hugging the spike or unconstrained.
        if let (Some(lo), Some(hi)) = (b.lower, b.upper) {
            assert!(lo <= curve.mode() && hi >= curve.mode());
        }
    }
}
