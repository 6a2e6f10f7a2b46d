use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::scoring::{RawMetrics, ScoreError, Strategy, WeightSet};

/// Contents of `config.yaml`.
///
/// Example YAML:
/// ```yaml
/// strategy: conservative
/// areas:
///   Parramatta:
///     population_growth: 2.8
///     rental_yield: 5.5
///     supply_ratio: 5.0
///     vacancy_rate: 1.8
///     mortgage_stress: 30.0
/// ```
///
/// Metric and weight maps stay string-keyed here so that a missing or
/// misspelled metric is reported by name instead of as a generic YAML error.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Preset weighting; ignored when `weights` is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,

    /// Custom per-metric weights, must cover all five metrics and sum to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<IndexMap<String, f64>>,

    /// Areas to compare, in the order they should be listed on ties
    #[serde(default)]
    pub areas: IndexMap<String, IndexMap<String, f64>>,
}

impl Config {
    /// Resolve the weights to score with.
    ///
    /// Precedence: `override_strategy` (from the command line), then custom
    /// `weights`, then the configured `strategy`, then the balanced default.
    pub fn weight_set(&self, override_strategy: Option<Strategy>) -> Result<WeightSet, ScoreError> {
        if let Some(strategy) = override_strategy {
            return Ok(strategy.weights());
        }
        match (&self.weights, self.strategy) {
            (Some(weights), _) => WeightSet::from_pairs(weights.iter().map(|(k, v)| (k, *v))),
            (None, Some(strategy)) => Ok(strategy.weights()),
            (None, None) => Ok(WeightSet::default()),
        }
    }

    /// Convert every configured area into typed metrics, keeping file order.
    pub fn raw_areas(&self) -> Result<IndexMap<String, RawMetrics>> {
        self.areas
            .iter()
            .map(|(name, metrics)| {
                let raw = RawMetrics::try_from_pairs(metrics.iter().map(|(k, v)| (k, *v)))
                    .with_context(|| format!("Invalid metrics for area '{}'", name))?;
                Ok((name.clone(), raw))
            })
            .collect()
    }
}
