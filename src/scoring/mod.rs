pub mod curves;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod weights;

pub use curves::{
    score_metric, score_mortgage_stress, score_population_growth, score_rental_yield,
    score_supply_ratio, score_vacancy_rate,
};
pub use engine::{
    Action, AttentionItem, ComparisonRow, CompositeResult, Evaluator, Grade, Recommendation,
};
pub use error::ScoreError;
pub use metrics::{MetricKey, MetricValues, RawMetrics, ScoreSet};
pub use weights::{validate_weights, Strategy, WeightSet};
