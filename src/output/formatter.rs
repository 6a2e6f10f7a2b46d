use std::io::IsTerminal;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{terminal_size, Width};

use crate::scoring::{
    Action, ComparisonRow, CompositeResult, Grade, MetricKey, Recommendation, Strategy,
};

const RULE_WIDTH: usize = 60;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// One `=` per 5 points, truncated (e.g. 92.5 -> 18 marks)
pub fn format_score_bar(score: f64) -> String {
    let marks = (score.clamp(0.0, 100.0) / 5.0) as usize;
    "=".repeat(marks)
}

/// Color text by grade band (traffic light pattern)
fn paint(text: &str, grade: Grade, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match grade {
        Grade::S => text.green().bold().to_string(),
        Grade::A => text.blue().bold().to_string(),
        Grade::B | Grade::C => text.yellow().to_string(),
        Grade::D => text.red().to_string(),
    }
}

fn action_grade(action: Action) -> Grade {
    match action {
        Action::StrongBuy => Grade::S,
        Action::Buy => Grade::A,
        Action::Hold => Grade::B,
        Action::Caution => Grade::C,
        Action::Avoid => Grade::D,
    }
}

/// Format the detailed single-area report: raw data, per-metric scores with
/// weights and bars, the overall grade, and the recommendation.
pub fn format_report(
    result: &CompositeResult,
    recommendation: &Recommendation,
    area_name: &str,
    use_colors: bool,
) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("{}\n", rule));
    let title = format!("Property Investment Assessment Report - {}", area_name);
    if use_colors {
        out.push_str(&format!("{}\n", title.bold()));
    } else {
        out.push_str(&format!("{}\n", title));
    }
    out.push_str(&format!("{}\n", rule));

    out.push_str("\n[Raw Data]\n");
    for (key, value) in result.raw_data.iter() {
        out.push_str(&format!(
            "  [{:<6}] {:<20}: {:6.2}%\n",
            key.tag(),
            key.display_name(),
            value
        ));
    }

    out.push_str("\n[Dimension Scores] (0-100 scale)\n");
    for (key, score) in result.individual_scores.iter() {
        let weight = result.weights.get(key);
        let bar = format_score_bar(score);
        let bar = paint(&bar, Grade::from_score(score), use_colors);
        out.push_str(&format!(
            "  [{:<6}] {:<20}: {:5.1} (weight {:4.1}%) {}\n",
            key.tag(),
            key.display_name(),
            score,
            weight * 100.0,
            bar
        ));
    }

    out.push_str("\n[Overall Assessment]\n");
    out.push_str(&format!(
        "  Composite Score: {:.2} / 100\n",
        result.composite_score
    ));
    out.push_str(&format!(
        "  Investment Grade: {}\n",
        paint(&result.grade.label(), result.grade, use_colors)
    ));

    out.push_str(&format_recommendation(recommendation, use_colors));
    out.push_str(&rule);
    out
}

/// Format the recommendation block, including metrics needing attention
pub fn format_recommendation(recommendation: &Recommendation, use_colors: bool) -> String {
    let mut out = String::new();
    let action = recommendation.action;
    let label = format!("[{}]", action);

    out.push_str("\n[Investment Recommendation]\n");
    out.push_str(&format!(
        "  {} {}\n",
        paint(&label, action_grade(action), use_colors),
        action.advice()
    ));

    if !recommendation.attention.is_empty() {
        out.push_str("\n  [ATTENTION] Areas requiring attention:\n");
        for item in &recommendation.attention {
            out.push_str(&format!(
                "     - {}: Low score ({:.1})\n",
                item.metric.display_name(),
                item.score
            ));
        }
    }
    out
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format ranked areas as a table.
/// Columns: rank, area, composite, grade, then one score per metric in
/// declaration order (headed by the metric's dimension tag).
pub fn format_comparison_table(rows: &[ComparisonRow], use_colors: bool) -> String {
    format_comparison_table_with_width(rows, use_colors, get_terminal_width())
}

fn format_comparison_table_with_width(
    rows: &[ComparisonRow],
    use_colors: bool,
    term_width: Option<usize>,
) -> String {
    if rows.is_empty() {
        return "No areas to compare.".to_string();
    }

    // Rank "99." + composite "100.00" + grade + five 6-char metric columns
    let fixed_width = 3 + 2 + 9 + 2 + 5 + 2 + MetricKey::ALL.len() * 8;
    let longest = rows
        .iter()
        .map(|r| r.area_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Area".len());
    let name_width = match term_width {
        Some(width) if width > fixed_width + 10 => longest.min(width - fixed_width),
        Some(_) => longest.min(20),
        None => longest,
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);

    let metric_headers: String = MetricKey::ALL
        .iter()
        .map(|k| format!("  {:>6}", k.tag()))
        .collect();
    let header = format!(
        "{:>3}  {:<name_width$}  {:>9}  {:<5}{}",
        "#",
        "Area",
        "Composite",
        "Grade",
        metric_headers,
        name_width = name_width
    );
    if use_colors {
        lines.push(header.dimmed().to_string());
    } else {
        lines.push(header);
    }

    for (idx, row) in rows.iter().enumerate() {
        let rank = format!("{:>2}.", idx + 1);
        let name = truncate_name(&row.area_name, name_width);
        let composite = format!("{:>9.2}", row.composite_score);
        let grade = format!("{:<5}", row.grade.to_string());
        let metric_cols: String = row
            .scores
            .iter()
            .map(|(_, score)| format!("  {:>6.1}", score))
            .collect();

        if use_colors {
            lines.push(format!(
                "{}  {:<name_width$}  {}  {}{}",
                rank.dimmed(),
                name,
                composite.bold(),
                paint(&grade, row.grade, true),
                metric_cols,
                name_width = name_width
            ));
        } else {
            lines.push(format!(
                "{}  {:<name_width$}  {}  {}{}",
                rank,
                name,
                composite,
                grade,
                metric_cols,
                name_width = name_width
            ));
        }
    }

    lines.join("\n")
}

/// Format ranked areas as tab-separated values for scripting
/// Columns: area, composite, grade, five metric scores (no headers, no colors)
pub fn format_tsv(rows: &[ComparisonRow]) -> String {
    rows.iter()
        .map(|row| {
            let scores: Vec<String> = row
                .scores
                .iter()
                .map(|(_, score)| format!("{:.1}", score))
                .collect();
            format!(
                "{}\t{:.2}\t{}\t{}",
                row.area_name,
                row.composite_score,
                row.grade,
                scores.join("\t")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Single-area payload for JSON output
#[derive(Debug, Serialize)]
pub struct EvaluationReport<'a> {
    pub area_name: &'a str,
    #[serde(flatten)]
    pub result: &'a CompositeResult,
    pub recommendation: &'a Recommendation,
}

/// Pretty-printed JSON for external chart and dashboard tooling
pub fn format_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")
}

/// List the preset strategies with their weight tables
pub fn format_strategies(use_colors: bool) -> String {
    Strategy::ALL
        .iter()
        .map(|strategy| {
            let name = if use_colors {
                strategy.as_str().bold().to_string()
            } else {
                strategy.as_str().to_string()
            };
            let weights: Vec<String> = strategy
                .weights()
                .iter()
                .map(|(key, w)| format!("    {:<20} {:>5.1}%", key.display_name(), w * 100.0))
                .collect();
            format!("{} - {}\n{}", name, strategy.description(), weights.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Evaluator, RawMetrics};

    fn sample_result() -> (CompositeResult, Recommendation) {
        let evaluator = Evaluator::default();
        let result = evaluator.evaluate(&RawMetrics::new(2.5, 5.5, 6.0, 2.0, 28.0));
        let rec = evaluator.recommend(&result);
        (result, rec)
    }

    fn sample_rows() -> Vec<ComparisonRow> {
        Evaluator::default().compare_areas(vec![
            ("Property A", RawMetrics::new(2.8, 5.5, 5.0, 1.8, 30.0)),
            ("Property B", RawMetrics::new(3.2, 6.0, 4.5, 1.5, 26.0)),
            ("Property C", RawMetrics::new(2.0, 4.8, 7.0, 2.5, 32.0)),
        ])
    }

    #[test]
    fn test_score_bar_one_mark_per_five_points() {
        assert_eq!(format_score_bar(92.5), "=".repeat(18));
        assert_eq!(format_score_bar(100.0), "=".repeat(20));
        assert_eq!(format_score_bar(4.9), "");
        assert_eq!(format_score_bar(-3.0), "");
    }

    #[test]
    fn test_report_sections() {
        let (result, rec) = sample_result();
        let report = format_report(&result, &rec, "Example City", false);
        assert!(report.contains("Property Investment Assessment Report - Example City"));
        assert!(report.contains("[Raw Data]"));
        assert!(report.contains("[DEMAND] Population Growth   :   2.50%"));
        assert!(report.contains("[RETURN] Rental Yield        :  88.8 (weight 25.0%)"));
        assert!(report.contains("Composite Score: 86.15 / 100"));
        assert!(report.contains("Investment Grade: S (Excellent)"));
        assert!(report.contains("[STRONG BUY] Area shows excellent performance"));
        assert!(!report.contains("[ATTENTION]"));
    }

    #[test]
    fn test_report_metric_order_is_fixed() {
        let (result, rec) = sample_result();
        let report = format_report(&result, &rec, "Example City", false);
        let positions: Vec<usize> = MetricKey::ALL
            .iter()
            .map(|k| report.find(k.display_name()).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_recommendation_lists_attention_items() {
        let evaluator = Evaluator::default();
        let result = evaluator.evaluate(&RawMetrics::new(0.5, 2.0, 6.0, 2.0, 50.0));
        let text = format_recommendation(&evaluator.recommend(&result), false);
        assert!(text.contains("[ATTENTION] Areas requiring attention:"));
        assert!(text.contains("- Population Growth: Low score (52.5)"));
        assert!(text.contains("- Rental Yield: Low score (45.0)"));
        assert!(text.contains("- Mortgage Stress: Low score (15.0)"));
    }

    #[test]
    fn test_comparison_table_empty() {
        assert_eq!(format_comparison_table(&[], false), "No areas to compare.");
    }

    #[test]
    fn test_comparison_table_ranked() {
        let rows = sample_rows();
        let table = format_comparison_table_with_width(&rows, false, None);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Composite"));
        assert!(lines[0].contains("DEMAND"));
        assert!(lines[1].starts_with(" 1.  Property B"));
        assert!(lines[3].starts_with(" 3.  Property C"));
    }

    #[test]
    fn test_comparison_table_truncates_on_narrow_terminal() {
        let rows = Evaluator::default().compare_areas(vec![(
            "An Extremely Long Suburb Name That Goes On",
            RawMetrics::new(2.5, 5.5, 6.0, 2.0, 28.0),
        )]);
        let table = format_comparison_table_with_width(&rows, false, Some(40));
        assert!(table.contains("An Extremely Long..."));
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Short", 20), "Short");
        assert_eq!(truncate_name("Wollongong North", 10), "Wollong...");
        assert_eq!(truncate_name("Hello", 3), "Hel");
    }

    #[test]
    fn test_tsv_columns() {
        let tsv = format_tsv(&sample_rows());
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line.split('\t').count(), 8);
        }
        assert!(lines[0].starts_with("Property B\t"));
    }

    #[test]
    fn test_tsv_empty() {
        assert_eq!(format_tsv(&[]), "");
    }

    #[test]
    fn test_json_evaluation_report() {
        let (result, rec) = sample_result();
        let report = EvaluationReport {
            area_name: "Example City",
            result: &result,
            recommendation: &rec,
        };
        let json: serde_json::Value =
            serde_json::from_str(&format_json(&report).unwrap()).unwrap();
        assert_eq!(json["area_name"], "Example City");
        assert_eq!(json["composite_score"], 86.15);
        assert_eq!(json["grade"], "S");
        assert_eq!(json["recommendation"]["action"], "STRONG BUY");
        assert!(json["individual_scores"]["vacancy_rate"].is_number());
    }

    #[test]
    fn test_strategies_listing() {
        let text = format_strategies(false);
        assert!(text.contains("balanced - "));
        assert!(text.contains("conservative - Focus on cash flow and stability"));
        assert!(text.contains("Rental Yield          35.0%"));
    }
}
