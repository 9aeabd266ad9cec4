//! Weighted Gaussian kernel density estimation.

use cs_core::{Error, KdeEstimator, Result};
use statrs::distribution::{Continuous, Normal};

/// Weighted Gaussian KDE with a Scott-rule bandwidth on the effective
/// sample size.
///
/// With normalized weights `w`, the effective sample size is `1 / Σw²` and
/// the kernel width is `factor · neff^(-1/5)` times the weighted standard
/// deviation. Output is unnormalized; callers normalize the integral.
#[derive(Debug, Clone, Copy, Default)]
pub struct MegKde;

impl KdeEstimator for MegKde {
    fn evaluate(
        &self,
        data: &[f64],
        weights: &[f64],
        factor: f64,
        xs: &[f64],
    ) -> Result<Vec<f64>> {
        if data.is_empty() {
            return Err(Error::Validation("KDE requires a non-empty sample".to_string()));
        }
        if data.len() != weights.len() {
            return Err(Error::Validation(format!(
                "KDE sample/weight length mismatch: {} vs {}",
                data.len(),
                weights.len()
            )));
        }
        if !(factor.is_finite() && factor > 0.0) {
            return Err(Error::Validation(format!(
                "KDE bandwidth factor must be finite and > 0, got {factor}"
            )));
        }

        let total: f64 = weights.iter().sum();
        if !(total > 0.0) {
            return Err(Error::Validation("KDE weights must have positive sum".to_string()));
        }
        let w: Vec<f64> = weights.iter().map(|&v| v / total).collect();

        let neff = 1.0 / w.iter().map(|&v| v * v).sum::<f64>();
        // Deviations are measured from data[0]; an exactly constant sample
        // then yields var == 0 instead of cancellation noise.
        let shift = data[0];
        let mean: f64 = w.iter().zip(data).map(|(&wi, &xi)| wi * (xi - shift)).sum();
        let var: f64 =
            w.iter().zip(data).map(|(&wi, &xi)| wi * (xi - shift - mean).powi(2)).sum();
        let sigma = var.sqrt() * factor * neff.powf(-0.2);
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::Computation(
                "KDE bandwidth collapsed (zero-variance sample)".to_string(),
            ));
        }

        // Safe by construction for mean=0, sigma=1.
        let kernel = Normal::new(0.0, 1.0).expect("standard normal should be constructible");
        let ys = xs
            .iter()
            .map(|&x| {
                w.iter()
                    .zip(data)
                    .map(|(&wi, &xi)| wi * kernel.pdf((x - xi) / sigma) / sigma)
                    .sum()
            })
            .collect();
        Ok(ys)
    }

    fn name(&self) -> &str {
        "MegKde"
    }
}
