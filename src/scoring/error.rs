use super::metrics::MetricKey;

/// Errors raised by the scoring engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ScoreError {
    /// Weights are missing, unknown, negative, or do not sum to 1.0.
    #[error("invalid weights: {0}")]
    Configuration(String),

    #[error("missing metric(s): {}", join_keys(.0))]
    MissingMetric(Vec<MetricKey>),

    #[error("unknown metric '{0}' (expected one of: {expected})", expected = join_keys(&MetricKey::ALL))]
    UnknownMetric(String),

    /// Two input keys resolved to the same metric, e.g. `vacancy_rate` and `Vacancy-Rate`.
    #[error("metric '{0}' given more than once")]
    DuplicateMetric(MetricKey),
}

fn join_keys(keys: &[MetricKey]) -> String {
    keys.iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_metric_message_lists_keys() {
        let err = ScoreError::MissingMetric(vec![MetricKey::RentalYield, MetricKey::VacancyRate]);
        assert_eq!(
            err.to_string(),
            "missing metric(s): rental_yield, vacancy_rate"
        );
    }

    #[test]
    fn test_unknown_metric_message_lists_expected() {
        let err = ScoreError::UnknownMetric("crime_rate".to_string());
        let msg = err.to_string();
        assert!(msg.contains("'crime_rate'"));
        assert!(msg.contains("population_growth, rental_yield"));
        assert!(msg.ends_with("mortgage_stress)"));
    }

    #[test]
    fn test_duplicate_metric_message_names_key() {
        let err = ScoreError::DuplicateMetric(MetricKey::VacancyRate);
        assert_eq!(err.to_string(), "metric 'vacancy_rate' given more than once");
    }
}
