//! Summary dispatcher: per-chain, per-parameter credible intervals.

use std::collections::BTreeMap;

use cs_core::{Bound, Error, KdeEstimator, MaxPosterior, Result};
use rayon::prelude::*;

use crate::chain::Chain;
use crate::density::build_density;
use crate::intervals::strategy_for;
use crate::kde::MegKde;

/// Dispatches summary requests to the strategy each chain is configured
/// with. Owns the KDE capability so estimators can be swapped for testing.
pub struct Summarizer {
    kde: Box<dyn KdeEstimator>,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self { kde: Box::new(MegKde) }
    }
}

impl Summarizer {
    /// Summarizer with the default weighted Gaussian KDE.
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarizer with a custom density estimator.
    pub fn with_kde(kde: Box<dyn KdeEstimator>) -> Self {
        Self { kde }
    }

    /// Credible interval for a single parameter of a single chain.
    ///
    /// Requesting a column the chain does not have is a hard error. An
    /// unconstrained outcome is not: it comes back as a [`Bound`] without
    /// edges, with a warning logged.
    pub fn summarize_parameter(&self, chain: &Chain, column: &str) -> Result<Bound> {
        let curve = build_density(chain, column, self.kde.as_ref())?;
        let cfg = chain.effective_config();
        let bound = strategy_for(cfg.statistic).estimate(&curve, cfg.summary_area);
        if bound.is_unconstrained() {
            log::warn!("Parameter {column} in chain {} is not constrained", chain.name());
        }
        Ok(bound)
    }

    /// Summaries for every requested chain and parameter.
    ///
    /// Each chain's configuration is finalized first (a sequential barrier),
    /// then chain×parameter pairs run in parallel. Parameters absent from a
    /// chain are silently skipped; `columns = None` summarizes everything.
    pub fn summarize(
        &self,
        chains: &mut [Chain],
        columns: Option<&[String]>,
    ) -> Result<BTreeMap<String, BTreeMap<String, Bound>>> {
        let selected: Vec<&mut Chain> = chains.iter_mut().collect();
        self.summarize_refs(selected, columns)
    }

    /// As [`Summarizer::summarize`], restricted to chains selected by name.
    ///
    /// Requesting a chain that is not present is a caller contract
    /// violation.
    pub fn summarize_selected(
        &self,
        chains: &mut [Chain],
        names: &[&str],
        columns: Option<&[String]>,
    ) -> Result<BTreeMap<String, BTreeMap<String, Bound>>> {
        for name in names {
            if !chains.iter().any(|c| c.name() == *name) {
                return Err(Error::Validation(format!("chain {name} not found")));
            }
        }
        let selected: Vec<&mut Chain> =
            chains.iter_mut().filter(|c| names.contains(&c.name())).collect();
        self.summarize_refs(selected, columns)
    }

    fn summarize_refs(
        &self,
        mut chains: Vec<&mut Chain>,
        columns: Option<&[String]>,
    ) -> Result<BTreeMap<String, BTreeMap<String, Bound>>> {
        // Finalize barrier: defaults resolve sequentially before any
        // parallel summary work touches the chains.
        for chain in chains.iter_mut() {
            chain.finalize();
        }

        let per_chain: Result<Vec<(String, BTreeMap<String, Bound>)>> = chains
            .par_iter()
            .map(|chain| {
                let chain: &Chain = chain;
                let mut bounds = BTreeMap::new();
                let requested: Vec<&String> = match columns {
                    Some(cols) => cols.iter().filter(|c| chain.has_column(c)).collect(),
                    None => chain.columns().iter().collect(),
                };
                for column in requested {
                    bounds.insert(column.clone(), self.summarize_parameter(chain, column)?);
                }
                Ok((chain.name().to_string(), bounds))
            })
            .collect();

        Ok(per_chain?.into_iter().collect())
    }

    /// Highest log-posterior point per chain. Chains without a posterior
    /// column are skipped.
    pub fn max_posteriors(&self, chains: &[Chain]) -> BTreeMap<String, MaxPosterior> {
        chains
            .iter()
            .filter_map(|c| c.max_posterior_point().map(|mp| (c.name().to_string(), mp)))
            .collect()
    }
}
