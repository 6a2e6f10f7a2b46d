//! Weighted composite investment scoring for real-estate areas.
//!
//! Five market metrics are mapped onto a 0-100 scale by fixed piecewise
//! curves, combined with validated weights, graded, and ranked.
//!
//! ```
//! use prop_score::scoring::{Evaluator, Grade, RawMetrics};
//!
//! let evaluator = Evaluator::default();
//! let result = evaluator.evaluate(&RawMetrics::new(2.5, 5.5, 6.0, 2.0, 28.0));
//! assert_eq!(result.grade, Grade::S);
//! ```

pub mod config;
pub mod output;
pub mod scoring;
