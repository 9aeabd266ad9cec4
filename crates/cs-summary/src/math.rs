//! Small numeric kernels shared across the density pipeline.
//!
//! These mirror the behavior the interval algorithms were designed against:
//! linear interpolation with clamped ends, Simpson integration on a uniform
//! grid, and a Gaussian filter with reflective boundary handling.

/// `n` evenly spaced points from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Linear interpolation of `(xp, fp)` at `x`, clamped to the end values.
///
/// `xp` must be non-decreasing. Flat runs in `xp` resolve to the first
/// matching index, which is the monotone-inverse convention the cumulative
/// inversions rely on.
pub fn interp_linear(xp: &[f64], fp: &[f64], x: f64) -> f64 {
    debug_assert_eq!(xp.len(), fp.len());
    let n = xp.len();
    match n {
        0 => return f64::NAN,
        1 => return fp[0],
        _ => {}
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    // First index with xp[i] >= x; in 1..n because of the clamps above.
    let i = xp.partition_point(|&v| v < x);
    let (x0, x1) = (xp[i - 1], xp[i]);
    if x1 <= x0 {
        return fp[i];
    }
    let t = (x - x0) / (x1 - x0);
    fp[i - 1] + t * (fp[i] - fp[i - 1])
}

/// Invert a normalized cumulative curve at mass `q`, with out-of-range
/// queries mapping to ±∞ instead of clamping.
///
/// Used where an out-of-range partner must be *discarded* rather than pinned
/// to the curve end (shortest-interval search).
pub fn interp_inverse_unbounded(cs: &[f64], xs: &[f64], q: f64) -> f64 {
    if cs.is_empty() {
        return f64::NAN;
    }
    if q < cs[0] {
        return f64::NEG_INFINITY;
    }
    if q > cs[cs.len() - 1] {
        return f64::INFINITY;
    }
    interp_linear(cs, xs, q)
}

/// Composite Simpson integration of uniformly spaced samples.
///
/// Falls back to a trapezoid on the final interval when the interval count
/// is odd.
pub fn simpson(ys: &[f64], dx: f64) -> f64 {
    let n = ys.len();
    if n < 2 {
        return 0.0;
    }
    if n == 2 {
        return 0.5 * dx * (ys[0] + ys[1]);
    }
    // Simpson needs an even interval count; use the largest odd point count.
    let m = if (n - 1) % 2 == 0 { n } else { n - 1 };
    let mut sum = ys[0] + ys[m - 1];
    for (i, &y) in ys.iter().enumerate().take(m - 1).skip(1) {
        sum += y * if i % 2 == 1 { 4.0 } else { 2.0 };
    }
    let mut total = sum * dx / 3.0;
    if m != n {
        total += 0.5 * dx * (ys[n - 2] + ys[n - 1]);
    }
    total
}

/// Gaussian smoothing with reflective boundaries.
///
/// Reflection (`d c b a | a b c d | d c b a`) keeps mass near the data edges
/// instead of bleeding it into implicit zero padding. The kernel is truncated
/// at 4σ.
pub fn gaussian_filter_reflect(values: &[f64], sigma: f64) -> Vec<f64> {
    let n = values.len() as isize;
    if n == 0 || !(sigma > 0.0) {
        return values.to_vec();
    }
    let radius = (4.0 * sigma + 0.5) as isize;
    let mut kernel = Vec::with_capacity((2 * radius + 1) as usize);
    for k in -radius..=radius {
        kernel.push((-0.5 * (k as f64 / sigma).powi(2)).exp());
    }
    let norm: f64 = kernel.iter().sum();

    (0..n)
        .map(|i| {
            let mut acc = 0.0;
            for (j, w) in kernel.iter().enumerate() {
                let idx = reflect(i + j as isize - radius, n);
                acc += w * values[idx];
            }
            acc / norm
        })
        .collect()
}

#[inline]
fn reflect(mut i: isize, n: isize) -> usize {
    loop {
        if i < 0 {
            i = -i - 1;
        } else if i >= n {
            i = 2 * n - i - 1;
        } else {
            return i as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(-1.0, 3.0, 5);
        assert_eq!(xs.len(), 5);
        assert_relative_eq!(xs[0], -1.0);
        assert_relative_eq!(xs[4], 3.0, epsilon = 1e-12);
        assert_relative_eq!(xs[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_interp_linear_midpoint_and_clamp() {
        let xp = [0.0, 1.0, 2.0];
        let fp = [0.0, 10.0, 0.0];
        assert!((interp_linear(&xp, &fp, 0.5) - 5.0).abs() < 1e-12);
        assert!((interp_linear(&xp, &fp, -5.0)).abs() < 1e-12, "clamps below");
        assert!((interp_linear(&xp, &fp, 5.0)).abs() < 1e-12, "clamps above");
    }

    #[test]
    fn test_interp_linear_flat_run_uses_first_match() {
        // Flat cumulative stretch: inversion must not divide by zero and must
        // land on the first index at the target mass.
        let cs = [0.0, 0.5, 0.5, 1.0];
        let xs = [0.0, 1.0, 2.0, 3.0];
        let x = interp_linear(&cs, &xs, 0.5);
        assert!((x - 1.0).abs() < 1e-12, "expected first match, got {x}");
    }

    #[test]
    fn test_interp_inverse_unbounded_fills_infinite() {
        let cs = [0.1, 0.5, 1.0];
        let xs = [0.0, 1.0, 2.0];
        assert_eq!(interp_inverse_unbounded(&cs, &xs, 1.5), f64::INFINITY);
        assert_eq!(interp_inverse_unbounded(&cs, &xs, 0.0), f64::NEG_INFINITY);
        assert!((interp_inverse_unbounded(&cs, &xs, 0.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_simpson_quadratic_exact() {
        // Simpson is exact for polynomials up to cubic: ∫₀¹ x² dx = 1/3.
        let xs = linspace(0.0, 1.0, 101);
        let ys: Vec<f64> = xs.iter().map(|&x| x * x).collect();
        let area = simpson(&ys, 0.01);
        assert_relative_eq!(area, 1.0 / 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_simpson_even_point_count() {
        let xs = linspace(0.0, 1.0, 100);
        let ys: Vec<f64> = xs.iter().map(|&x| x).collect();
        let dx = 1.0 / 99.0;
        let area = simpson(&ys, dx);
        assert!((area - 0.5).abs() < 1e-6, "got {area}");
    }

    #[test]
    fn test_gaussian_filter_preserves_mass() {
        let mut values = vec![0.0; 50];
        values[25] = 1.0;
        let smoothed = gaussian_filter_reflect(&values, 3.0);
        let sum: f64 = smoothed.iter().sum();
        assert!((sum - 1.0).abs() < 1e-10, "reflect mode must conserve mass: {sum}");
        assert!(smoothed[25] < 1.0 && smoothed[25] > smoothed[20]);
    }

    #[test]
    fn test_gaussian_filter_edge_reflection() {
        // A spike at the boundary keeps its mass under reflection.
        let mut values = vec![0.0; 50];
        values[0] = 1.0;
        let smoothed = gaussian_filter_reflect(&values, 2.0);
        let sum: f64 = smoothed.iter().sum();
        assert!((sum - 1.0).abs() < 1e-10, "boundary spike lost mass: {sum}");
    }

    #[test]
    fn test_gaussian_filter_zero_sigma_is_identity() {
        let values = vec![1.0, 2.0, 3.0];
        assert_eq!(gaussian_filter_reflect(&values, 0.0), values);
    }
}
