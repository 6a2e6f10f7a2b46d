use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::error::ScoreError;

/// The five market dimensions an area is scored on.
///
/// Declaration order is the canonical order used everywhere a metric set is
/// listed: reports, JSON output, attention lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    PopulationGrowth,
    RentalYield,
    SupplyRatio,
    VacancyRate,
    MortgageStress,
}

impl MetricKey {
    pub const ALL: [MetricKey; 5] = [
        MetricKey::PopulationGrowth,
        MetricKey::RentalYield,
        MetricKey::SupplyRatio,
        MetricKey::VacancyRate,
        MetricKey::MortgageStress,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Identifier used in config files and JSON output
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKey::PopulationGrowth => "population_growth",
            MetricKey::RentalYield => "rental_yield",
            MetricKey::SupplyRatio => "supply_ratio",
            MetricKey::VacancyRate => "vacancy_rate",
            MetricKey::MortgageStress => "mortgage_stress",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MetricKey::PopulationGrowth => "Population Growth",
            MetricKey::RentalYield => "Rental Yield",
            MetricKey::SupplyRatio => "Supply Ratio",
            MetricKey::VacancyRate => "Vacancy Rate",
            MetricKey::MortgageStress => "Mortgage Stress",
        }
    }

    /// Short tag naming the investment dimension the metric stands for
    pub fn tag(self) -> &'static str {
        match self {
            MetricKey::PopulationGrowth => "DEMAND",
            MetricKey::RentalYield => "RETURN",
            MetricKey::SupplyRatio => "SUPPLY",
            MetricKey::VacancyRate => "STABLE",
            MetricKey::MortgageStress => "AFFORD",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = ScoreError;

    /// Accepts the snake_case identifier; hyphens and case are tolerated
    /// so CLI-style spellings like `Rental-Yield` resolve too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        MetricKey::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| ScoreError::UnknownMetric(s.trim().to_string()))
    }
}

/// One number per metric.
///
/// Used for raw inputs, per-metric scores, and (wrapped) weights. The fixed
/// shape means a well-typed caller can never leave a metric out.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricValues {
    pub population_growth: f64,
    pub rental_yield: f64,
    pub supply_ratio: f64,
    pub vacancy_rate: f64,
    pub mortgage_stress: f64,
}

/// Raw market figures for an area, in percent.
pub type RawMetrics = MetricValues;

/// Per-metric scores on the 0-100 scale.
pub type ScoreSet = MetricValues;

impl MetricValues {
    pub const fn new(
        population_growth: f64,
        rental_yield: f64,
        supply_ratio: f64,
        vacancy_rate: f64,
        mortgage_stress: f64,
    ) -> Self {
        Self {
            population_growth,
            rental_yield,
            supply_ratio,
            vacancy_rate,
            mortgage_stress,
        }
    }

    /// Build a value set by computing each metric in declaration order.
    pub fn from_fn(mut f: impl FnMut(MetricKey) -> f64) -> Self {
        Self {
            population_growth: f(MetricKey::PopulationGrowth),
            rental_yield: f(MetricKey::RentalYield),
            supply_ratio: f(MetricKey::SupplyRatio),
            vacancy_rate: f(MetricKey::VacancyRate),
            mortgage_stress: f(MetricKey::MortgageStress),
        }
    }

    pub fn get(&self, key: MetricKey) -> f64 {
        match key {
            MetricKey::PopulationGrowth => self.population_growth,
            MetricKey::RentalYield => self.rental_yield,
            MetricKey::SupplyRatio => self.supply_ratio,
            MetricKey::VacancyRate => self.vacancy_rate,
            MetricKey::MortgageStress => self.mortgage_stress,
        }
    }

    /// Iterate `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, f64)> + '_ {
        MetricKey::ALL.into_iter().map(move |k| (k, self.get(k)))
    }

    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum()
    }

    /// Build a value set from string-keyed input (config files, JSON).
    ///
    /// Every metric must be present exactly once. Unknown keys are rejected
    /// rather than ignored so a typo cannot silently drop a metric, and two
    /// spellings of the same metric are rejected rather than one overriding
    /// the other.
    pub fn try_from_pairs<I, K>(pairs: I) -> Result<Self, ScoreError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut slots: [Option<f64>; 5] = [None; 5];
        for (name, value) in pairs {
            let key: MetricKey = name.as_ref().parse()?;
            if slots[key.index()].replace(value).is_some() {
                return Err(ScoreError::DuplicateMetric(key));
            }
        }

        let missing: Vec<MetricKey> = MetricKey::ALL
            .into_iter()
            .filter(|k| slots[k.index()].is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ScoreError::MissingMetric(missing));
        }

        Ok(Self::from_fn(|k| slots[k.index()].unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_key_order_matches_declaration() {
        let names: Vec<&str> = MetricKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "population_growth",
                "rental_yield",
                "supply_ratio",
                "vacancy_rate",
                "mortgage_stress"
            ]
        );
    }

    #[test]
    fn test_metric_key_parse() {
        assert_eq!("rental_yield".parse::<MetricKey>().unwrap(), MetricKey::RentalYield);
        assert_eq!(" Vacancy-Rate ".parse::<MetricKey>().unwrap(), MetricKey::VacancyRate);
        assert!(matches!(
            "crime_rate".parse::<MetricKey>(),
            Err(ScoreError::UnknownMetric(name)) if name == "crime_rate"
        ));
    }

    #[test]
    fn test_display_tables() {
        assert_eq!(MetricKey::SupplyRatio.display_name(), "Supply Ratio");
        assert_eq!(MetricKey::MortgageStress.tag(), "AFFORD");
        assert_eq!(MetricKey::PopulationGrowth.to_string(), "population_growth");
    }

    #[test]
    fn test_iter_yields_declaration_order() {
        let values = MetricValues::new(1.0, 2.0, 3.0, 4.0, 5.0);
        let collected: Vec<(MetricKey, f64)> = values.iter().collect();
        assert_eq!(collected[0], (MetricKey::PopulationGrowth, 1.0));
        assert_eq!(collected[4], (MetricKey::MortgageStress, 5.0));
        assert_eq!(values.sum(), 15.0);
    }

    #[test]
    fn test_try_from_pairs_complete() {
        let pairs = vec![
            ("mortgage_stress", 28.0),
            ("population_growth", 2.5),
            ("rental_yield", 5.5),
            ("supply_ratio", 6.0),
            ("vacancy_rate", 2.0),
        ];
        let raw = MetricValues::try_from_pairs(pairs).unwrap();
        assert_eq!(raw, MetricValues::new(2.5, 5.5, 6.0, 2.0, 28.0));
    }

    #[test]
    fn test_try_from_pairs_reports_every_missing_key_in_order() {
        let pairs = vec![("vacancy_rate", 2.0), ("population_growth", 2.5)];
        let err = MetricValues::try_from_pairs(pairs).unwrap_err();
        assert_eq!(
            err,
            ScoreError::MissingMetric(vec![
                MetricKey::RentalYield,
                MetricKey::SupplyRatio,
                MetricKey::MortgageStress
            ])
        );
    }

    #[test]
    fn test_try_from_pairs_rejects_unknown_key() {
        let pairs = vec![("population_growth", 2.5), ("crime_rate", 1.0)];
        let err = MetricValues::try_from_pairs(pairs).unwrap_err();
        assert_eq!(err, ScoreError::UnknownMetric("crime_rate".to_string()));
    }

    #[test]
    fn test_try_from_pairs_rejects_second_spelling_of_same_key() {
        let pairs = vec![
            ("population_growth", 2.5),
            ("rental_yield", 5.5),
            ("supply_ratio", 6.0),
            ("vacancy_rate", 2.0),
            ("mortgage_stress", 28.0),
            ("Population-Growth", -9.0),
        ];
        let err = MetricValues::try_from_pairs(pairs).unwrap_err();
        assert_eq!(err, ScoreError::DuplicateMetric(MetricKey::PopulationGrowth));
    }

    #[test]
    fn test_serializes_in_declaration_order() {
        let json = serde_json::to_string(&MetricValues::new(1.0, 2.0, 3.0, 4.0, 5.0)).unwrap();
        assert_eq!(
            json,
            r#"{"population_growth":1.0,"rental_yield":2.0,"supply_ratio":3.0,"vacancy_rate":4.0,"mortgage_stress":5.0}"#
        );
    }
}
