pub mod formatter;

pub use formatter::{
    format_comparison_table, format_json, format_recommendation, format_report,
    format_score_bar, format_strategies, format_tsv, should_use_colors, EvaluationReport,
};
