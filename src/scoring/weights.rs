use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ScoreError;
use super::metrics::{MetricKey, MetricValues};

/// Allowed absolute deviation of the weight total from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

// Absorbs float error when weights like 0.25 + 0.24 + ... land exactly on the
// tolerance edge.
const SUM_EPSILON: f64 = 1e-9;

/// Validated per-metric weights.
///
/// Only obtainable through [`WeightSet::new`], [`WeightSet::from_pairs`] or a
/// [`Strategy`] preset, so holding one means every weight is a finite
/// non-negative number and the total is 1.0 within [`WEIGHT_SUM_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeightSet(MetricValues);

impl WeightSet {
    pub fn new(values: MetricValues) -> Result<Self, ScoreError> {
        validate_weights(&values).map_err(|errors| ScoreError::Configuration(errors.join("; ")))?;
        Ok(Self(values))
    }

    /// Build weights from string-keyed input such as a YAML `weights:` map.
    ///
    /// Missing or unknown metric names are configuration errors here, not
    /// input errors: a weight table is configuration.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self, ScoreError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let values = MetricValues::try_from_pairs(pairs).map_err(|e| match e {
            ScoreError::MissingMetric(keys) => ScoreError::Configuration(format!(
                "no weight given for {}",
                keys.iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            ScoreError::UnknownMetric(name) => {
                ScoreError::Configuration(format!("weight given for unknown metric '{}'", name))
            }
            ScoreError::DuplicateMetric(key) => {
                ScoreError::Configuration(format!("weight for {} given more than once", key))
            }
            other => other,
        })?;
        Self::new(values)
    }

    pub fn get(&self, key: MetricKey) -> f64 {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, f64)> + '_ {
        self.0.iter()
    }

    pub fn values(&self) -> &MetricValues {
        &self.0
    }

    pub fn total(&self) -> f64 {
        self.0.sum()
    }
}

impl Default for WeightSet {
    fn default() -> Self {
        Strategy::Balanced.weights()
    }
}

/// Check a weight table, returning every problem found (not just the first).
pub fn validate_weights(values: &MetricValues) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (key, weight) in values.iter() {
        if !weight.is_finite() {
            errors.push(format!("weights.{}: must be a finite number", key));
        } else if weight < 0.0 {
            errors.push(format!("weights.{}: must be non-negative, got {}", key, weight));
        }
    }

    // A non-finite weight already makes the total meaningless
    if errors.is_empty() {
        let total = values.sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE + SUM_EPSILON {
            errors.push(format!(
                "weights: must sum to 1.0 (±{}), currently {:.3}",
                WEIGHT_SUM_TOLERANCE, total
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Preset weight tables for common investment approaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Even emphasis on demand and return
    #[default]
    Balanced,
    /// Favors cash flow and stability
    Conservative,
    /// Favors growth potential and supply pressure
    Aggressive,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Balanced, Strategy::Conservative, Strategy::Aggressive];

    pub fn weights(self) -> WeightSet {
        let values = match self {
            Strategy::Balanced => MetricValues::new(0.25, 0.25, 0.20, 0.15, 0.15),
            Strategy::Conservative => MetricValues::new(0.15, 0.35, 0.15, 0.20, 0.15),
            Strategy::Aggressive => MetricValues::new(0.40, 0.15, 0.25, 0.10, 0.10),
        };
        WeightSet(values)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Balanced => "balanced",
            Strategy::Conservative => "conservative",
            Strategy::Aggressive => "aggressive",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Strategy::Balanced => "Default weights, suitable for most investors",
            Strategy::Conservative => "Focus on cash flow and stability",
            Strategy::Aggressive => "Focus on growth potential and supply pressure",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| {
                ScoreError::Configuration(format!(
                    "unknown strategy '{}' (expected balanced, conservative or aggressive)",
                    s.trim()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_sum(total: f64) -> MetricValues {
        // Put the deviation on one weight, keep the others at the defaults
        MetricValues::new(0.25, 0.25, 0.20, 0.15, 0.15 + (total - 1.0))
    }

    #[test]
    fn test_default_is_balanced() {
        let weights = WeightSet::default();
        assert_eq!(weights.get(MetricKey::PopulationGrowth), 0.25);
        assert_eq!(weights.get(MetricKey::RentalYield), 0.25);
        assert_eq!(weights.get(MetricKey::SupplyRatio), 0.20);
        assert_eq!(weights.get(MetricKey::VacancyRate), 0.15);
        assert_eq!(weights.get(MetricKey::MortgageStress), 0.15);
    }

    #[test]
    fn test_presets_are_valid() {
        for strategy in Strategy::ALL {
            let weights = strategy.weights();
            assert!(validate_weights(weights.values()).is_ok(), "{strategy} invalid");
        }
    }

    #[test]
    fn test_sum_outside_tolerance_rejected() {
        for total in [0.95, 1.05, 0.9, 1.2] {
            let result = WeightSet::new(with_sum(total));
            assert!(
                matches!(result, Err(ScoreError::Configuration(_))),
                "sum {total} should be rejected"
            );
        }
    }

    #[test]
    fn test_sum_within_tolerance_accepted() {
        for total in [0.99, 0.995, 1.0, 1.005, 1.01] {
            assert!(WeightSet::new(with_sum(total)).is_ok(), "sum {total} should pass");
        }
    }

    #[test]
    fn test_negative_weight_rejected() {
        let values = MetricValues::new(0.5, 0.5, 0.2, -0.2, 0.0);
        let err = WeightSet::new(values).unwrap_err();
        assert!(err.to_string().contains("weights.vacancy_rate: must be non-negative"));
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        let values = MetricValues::new(f64::NAN, 0.25, 0.20, 0.15, 0.15);
        let err = WeightSet::new(values).unwrap_err();
        assert!(err.to_string().contains("weights.population_growth: must be a finite number"));
    }

    #[test]
    fn test_collects_all_errors() {
        let values = MetricValues::new(-0.1, -0.1, 0.2, 0.5, 0.5);
        let errors = validate_weights(&values).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_from_pairs_missing_weight_is_configuration_error() {
        let err = WeightSet::from_pairs(vec![("population_growth", 0.5), ("rental_yield", 0.5)])
            .unwrap_err();
        match err {
            ScoreError::Configuration(msg) => {
                assert!(msg.contains("supply_ratio, vacancy_rate, mortgage_stress"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_pairs_unknown_weight_is_configuration_error() {
        let err = WeightSet::from_pairs(vec![
            ("population_growth", 0.2),
            ("rental_yield", 0.2),
            ("supply_ratio", 0.2),
            ("vacancy_rate", 0.2),
            ("mortgage_stress", 0.1),
            ("school_zone", 0.1),
        ])
        .unwrap_err();
        assert!(matches!(err, ScoreError::Configuration(msg) if msg.contains("school_zone")));
    }

    #[test]
    fn test_from_pairs_duplicate_weight_is_configuration_error() {
        let err = WeightSet::from_pairs(vec![
            ("population_growth", 0.25),
            ("rental_yield", 0.25),
            ("supply_ratio", 0.2),
            ("vacancy_rate", 0.15),
            ("mortgage_stress", 0.15),
            ("Rental-Yield", 0.0),
        ])
        .unwrap_err();
        assert!(matches!(err, ScoreError::Configuration(msg) if msg.contains("rental_yield")));
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("Conservative".parse::<Strategy>().unwrap(), Strategy::Conservative);
        assert!("yolo".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_weight_set_serializes_as_plain_map() {
        let json = serde_json::to_string(&WeightSet::default()).unwrap();
        assert!(json.starts_with(r#"{"population_growth":0.25,"rental_yield":0.25"#));
    }
}
