use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;

use super::curves::score_metric;
use super::error::ScoreError;
use super::metrics::{MetricKey, MetricValues, RawMetrics, ScoreSet};
use super::weights::{Strategy, WeightSet};

/// Metrics scoring below this are flagged for attention in a recommendation.
pub const ATTENTION_THRESHOLD: f64 = 60.0;

/// Letter grade for a composite score, declared best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Inclusive lower bounds, checked top-down; anything below the last is D.
    const THRESHOLDS: [(f64, Grade); 4] = [
        (85.0, Grade::S),
        (75.0, Grade::A),
        (65.0, Grade::B),
        (50.0, Grade::C),
    ];

    pub fn from_score(score: f64) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::D)
    }

    pub fn description(self) -> &'static str {
        match self {
            Grade::S => "Excellent",
            Grade::A => "Good",
            Grade::B => "Above Average",
            Grade::C => "Average",
            Grade::D => "Below Average",
        }
    }

    /// e.g. "S (Excellent)"
    pub fn label(self) -> String {
        format!("{} ({})", self, self.description())
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        };
        f.write_str(letter)
    }
}

/// Investment action, one per grade band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "CAUTION")]
    Caution,
    #[serde(rename = "AVOID")]
    Avoid,
}

impl Action {
    pub fn from_score(score: f64) -> Self {
        match Grade::from_score(score) {
            Grade::S => Action::StrongBuy,
            Grade::A => Action::Buy,
            Grade::B => Action::Hold,
            Grade::C => Action::Caution,
            Grade::D => Action::Avoid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::StrongBuy => "STRONG BUY",
            Action::Buy => "BUY",
            Action::Hold => "HOLD",
            Action::Caution => "CAUTION",
            Action::Avoid => "AVOID",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            Action::StrongBuy => "Area shows excellent performance with high investment value",
            Action::Buy => "Area shows good performance, worth serious consideration",
            Action::Hold => "Area shows above average performance, further analysis recommended",
            Action::Caution => "Area shows average performance, careful risk assessment needed",
            Action::Avoid => "Area shows weak performance, consider other locations",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full evaluation of one area: inputs, per-metric scores, and the verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeResult {
    pub raw_data: RawMetrics,
    pub individual_scores: ScoreSet,
    /// Weighted sum of the individual scores, rounded to 2 decimals
    pub composite_score: f64,
    pub grade: Grade,
    pub weights: WeightSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttentionItem {
    pub metric: MetricKey,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub action: Action,
    /// Weak metrics in declaration order, not sorted by score
    pub attention: Vec<AttentionItem>,
}

/// One ranked line of a multi-area comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub area_name: String,
    pub composite_score: f64,
    pub grade: Grade,
    pub scores: ScoreSet,
}

/// Scores areas against a fixed weight table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluator {
    weights: WeightSet,
}

impl Evaluator {
    pub fn new(weights: WeightSet) -> Self {
        Self { weights }
    }

    pub fn with_strategy(strategy: Strategy) -> Self {
        Self::new(strategy.weights())
    }

    /// Build an evaluator from string-keyed weights, validating them first.
    pub fn from_weight_pairs<I, K>(pairs: I) -> Result<Self, ScoreError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        Ok(Self::new(WeightSet::from_pairs(pairs)?))
    }

    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    pub fn score(&self, raw: &RawMetrics) -> ScoreSet {
        MetricValues::from_fn(|key| score_metric(key, raw.get(key)))
    }

    /// Score string-keyed input; every metric must be present.
    pub fn score_map<I, K>(&self, pairs: I) -> Result<ScoreSet, ScoreError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let raw = RawMetrics::try_from_pairs(pairs)?;
        Ok(self.score(&raw))
    }

    pub fn evaluate(&self, raw: &RawMetrics) -> CompositeResult {
        let scores = self.score(raw);
        let weighted: f64 = scores
            .iter()
            .map(|(key, score)| score * self.weights.get(key))
            .sum();
        let composite_score = round2(weighted);

        CompositeResult {
            raw_data: *raw,
            individual_scores: scores,
            composite_score,
            // Graded on the rounded value so grade and recommendation agree
            grade: Grade::from_score(composite_score),
            weights: self.weights,
        }
    }

    pub fn evaluate_pairs<I, K>(&self, pairs: I) -> Result<CompositeResult, ScoreError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let raw = RawMetrics::try_from_pairs(pairs)?;
        Ok(self.evaluate(&raw))
    }

    pub fn recommend(&self, result: &CompositeResult) -> Recommendation {
        let attention = result
            .individual_scores
            .iter()
            .filter(|(_, score)| *score < ATTENTION_THRESHOLD)
            .map(|(metric, score)| AttentionItem { metric, score })
            .collect();

        Recommendation {
            action: Action::from_score(result.composite_score),
            attention,
        }
    }

    /// Evaluate every area independently and rank by composite score.
    ///
    /// Sorting is stable: areas with equal scores keep their input order.
    pub fn compare_areas<I, S, R>(&self, areas: I) -> Vec<ComparisonRow>
    where
        I: IntoIterator<Item = (S, R)>,
        S: Into<String>,
        R: Borrow<RawMetrics>,
    {
        let mut rows: Vec<ComparisonRow> = areas
            .into_iter()
            .map(|(name, raw)| {
                let result = self.evaluate(raw.borrow());
                ComparisonRow {
                    area_name: name.into(),
                    composite_score: result.composite_score,
                    grade: result.grade,
                    scores: result.individual_scores,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            b.composite_score
                .partial_cmp(&a.composite_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rows
    }
}

/// Two-decimal rounding; exact halves go to the even neighbour.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
