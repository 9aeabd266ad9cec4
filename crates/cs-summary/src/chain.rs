//! Chain storage: named sample columns plus per-chain summary configuration.

use std::collections::{BTreeMap, HashMap};

use cs_core::{Error, MaxPosterior, Result, SummaryStatistic};
use serde::{Deserialize, Serialize};

/// Desired credible mass when none is configured (1σ).
pub const DEFAULT_CREDIBLE_MASS: f64 = 0.6827;
/// Gaussian smoothing scale (in bins) when none is configured.
pub const DEFAULT_SMOOTH: usize = 3;

/// Resolved per-chain summary configuration.
///
/// Produced once by [`Chain::finalize`]; every field has its default applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Which interval strategy to run.
    pub statistic: SummaryStatistic,
    /// Desired credible mass in (0, 1).
    pub summary_area: f64,
    /// Histogram bin count.
    pub bins: usize,
    /// Gaussian smoothing sigma in bins; 0 disables smoothing.
    pub smooth: usize,
    /// KDE bandwidth factor; `None` disables KDE.
    pub kde: Option<f64>,
}

/// One chain of posterior samples: a table of named columns with a shared
/// weight column and summary configuration.
///
/// Configuration is resolved at most once ([`Chain::finalize`], idempotent);
/// after that the chain is read-only from the engine's perspective.
#[derive(Debug, Clone)]
pub struct Chain {
    name: String,
    columns: Vec<String>,
    data: HashMap<String, Vec<f64>>,
    weights: Vec<f64>,
    posterior: Option<Vec<f64>>,
    grid: bool,
    power: Option<f64>,
    smooth: Option<usize>,
    bins: Option<usize>,
    kde: Option<f64>,
    summary_area: Option<f64>,
    statistic: Option<SummaryStatistic>,
    resolved: Option<SummaryConfig>,
}

impl Chain {
    /// Create a chain from named sample columns. Columns must be non-empty
    /// and of equal length; weights default to uniform.
    pub fn new(name: impl Into<String>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let name = name.into();
        if columns.is_empty() {
            return Err(Error::Validation(format!("chain {name} has no sample columns")));
        }
        let n = columns[0].1.len();
        if n == 0 {
            return Err(Error::Validation(format!("chain {name} has empty sample columns")));
        }
        let mut order = Vec::with_capacity(columns.len());
        let mut data = HashMap::with_capacity(columns.len());
        for (col, values) in columns {
            if values.len() != n {
                return Err(Error::Validation(format!(
                    "column {col} in chain {name} has length {}, expected {n}",
                    values.len()
                )));
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(Error::Validation(format!(
                    "column {col} in chain {name} contains non-finite samples"
                )));
            }
            if data.insert(col.clone(), values).is_some() {
                return Err(Error::Validation(format!("duplicate column {col} in chain {name}")));
            }
            order.push(col);
        }
        Ok(Self {
            name,
            columns: order,
            data,
            weights: vec![1.0; n],
            posterior: None,
            grid: false,
            power: None,
            smooth: None,
            bins: None,
            kde: None,
            summary_area: None,
            statistic: None,
            resolved: None,
        })
    }

    /// Attach a weight column (non-negative, positive sum, same length).
    pub fn with_weights(mut self, weights: Vec<f64>) -> Result<Self> {
        if weights.len() != self.len() {
            return Err(Error::Validation(format!(
                "weight column length {} does not match sample length {} in chain {}",
                weights.len(),
                self.len(),
                self.name
            )));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::Validation(format!(
                "weights in chain {} must be finite and non-negative",
                self.name
            )));
        }
        if !(weights.iter().sum::<f64>() > 0.0) {
            return Err(Error::Validation(format!(
                "weights in chain {} must have positive sum",
                self.name
            )));
        }
        self.weights = weights;
        Ok(self)
    }

    /// Attach a log-posterior column (same length as the samples).
    pub fn with_posterior(mut self, posterior: Vec<f64>) -> Result<Self> {
        if posterior.len() != self.len() {
            return Err(Error::Validation(format!(
                "posterior column length {} does not match sample length {} in chain {}",
                posterior.len(),
                self.len(),
                self.name
            )));
        }
        self.posterior = Some(posterior);
        Ok(self)
    }

    /// Mark the samples as lying on a regular grid (bin edges inferred from
    /// the unique values).
    pub fn with_grid(mut self, grid: bool) -> Self {
        self.grid = grid;
        self
    }

    /// Raise the density to `power` element-wise before normalization.
    pub fn with_power(mut self, power: f64) -> Result<Self> {
        if !power.is_finite() {
            return Err(Error::Validation(format!("power must be finite, got {power}")));
        }
        self.power = Some(power);
        Ok(self)
    }

    /// Gaussian smoothing sigma in bins; 0 disables smoothing.
    pub fn with_smooth(mut self, smooth: usize) -> Self {
        self.smooth = Some(smooth);
        self
    }

    /// Histogram bin count (at least 2).
    pub fn with_bins(mut self, bins: usize) -> Result<Self> {
        if bins < 2 {
            return Err(Error::Validation(format!("bin count must be at least 2, got {bins}")));
        }
        self.bins = Some(bins);
        Ok(self)
    }

    /// Enable kernel density estimation with the given bandwidth factor.
    pub fn with_kde(mut self, factor: f64) -> Result<Self> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(Error::Validation(format!(
                "KDE bandwidth factor must be finite and > 0, got {factor}"
            )));
        }
        self.kde = Some(factor);
        Ok(self)
    }

    /// Desired credible mass, e.g. 0.6827 for 1σ.
    pub fn with_summary_area(mut self, mass: f64) -> Result<Self> {
        if !(mass.is_finite() && mass > 0.0 && mass < 1.0) {
            return Err(Error::Validation(format!(
                "credible mass must be in (0, 1), got {mass}"
            )));
        }
        self.summary_area = Some(mass);
        Ok(self)
    }

    /// Select the interval strategy for this chain.
    pub fn with_statistic(mut self, statistic: SummaryStatistic) -> Self {
        self.statistic = Some(statistic);
        self
    }

    /// Chain name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether the chain has a column of this name.
    pub fn has_column(&self, column: &str) -> bool {
        self.data.contains_key(column)
    }

    /// Samples for one column; missing columns are a caller contract
    /// violation.
    pub fn data(&self, column: &str) -> Result<&[f64]> {
        self.data.get(column).map(|v| v.as_slice()).ok_or_else(|| {
            Error::Validation(format!("column {column} not found in chain {}", self.name))
        })
    }

    /// Weight column (uniform unless configured).
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of samples per column.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True when the chain holds no samples (never, by construction).
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Whether samples lie on a regular grid.
    pub fn is_grid(&self) -> bool {
        self.grid
    }

    /// Density power exponent, if configured.
    pub fn power(&self) -> Option<f64> {
        self.power
    }

    /// Resolve configuration defaults once. Safe to call repeatedly.
    pub fn finalize(&mut self) {
        if self.resolved.is_none() {
            self.resolved = Some(self.resolve_config());
        }
    }

    /// Whether [`Chain::finalize`] has run.
    pub fn is_finalized(&self) -> bool {
        self.resolved.is_some()
    }

    /// The resolved configuration; computed on the fly when the chain has
    /// not been finalized yet.
    pub fn effective_config(&self) -> SummaryConfig {
        self.resolved.unwrap_or_else(|| self.resolve_config())
    }

    fn resolve_config(&self) -> SummaryConfig {
        // Grid chains and KDE chains replace histogram smoothing.
        let smooth = self
            .smooth
            .unwrap_or(if self.grid || self.kde.is_some() { 0 } else { DEFAULT_SMOOTH });
        SummaryConfig {
            statistic: self.statistic.unwrap_or_default(),
            summary_area: self.summary_area.unwrap_or(DEFAULT_CREDIBLE_MASS),
            bins: self.bins.unwrap_or_else(|| default_bin_count(self.len(), smooth > 0)),
            smooth,
            kde: self.kde,
        }
    }

    /// The sample with the highest finite log-posterior value, if a
    /// posterior column is attached.
    pub fn max_posterior_point(&self) -> Option<MaxPosterior> {
        let posterior = self.posterior.as_deref()?;
        let (idx, &lp) = posterior
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .max_by(|a, b| a.1.total_cmp(b.1))?;
        let coordinate: BTreeMap<String, f64> = self
            .columns
            .iter()
            .map(|c| (c.clone(), self.data[c][idx]))
            .collect();
        Some(MaxPosterior { log_posterior: lp, coordinate })
    }
}

/// Default bin count: grows with the sample count, capped lower when a
/// Gaussian filter is going to blur the bins anyway.
fn default_bin_count(n: usize, smoothing: bool) -> usize {
    let max_bins = if smoothing { 35 } else { 100 };
    let proposal = (n as f64 / 10.0).powf(0.4).floor() as usize;
    proposal.clamp(5, max_bins)
}
