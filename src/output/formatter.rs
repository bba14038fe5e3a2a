use std::io::IsTerminal;
use chrono::Duration;
use owo_colors::OwoColorize;
use serde_json::Value;
use terminal_size::{Width, terminal_size};

use crate::backend::Submission;
use crate::explain::{AssessmentResult, Decision, Explanation, RankedContribution, StoredAssessment};
use crate::record::{AccountId, ApplicantRecord};

/// Longest feature name shown before truncation
const MAX_LABEL_WIDTH: usize = 28;
/// Bar half-width (each side of the axis) when stdout is not a terminal
const DEFAULT_HALF_WIDTH: usize = 20;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a label to fit available width, accounting for Unicode
pub fn truncate_label(label: &str, max_width: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_width {
        label.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Render a raw feature value compactly: 50000.0 prints as "50000".
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Signed score with four decimals ("+0.0200", "-0.5500")
pub fn format_score(score: f64) -> String {
    format!("{:+.4}", score)
}

/// Number of bar cells for `score` on a side `half_width` cells wide.
pub fn bar_cells(score: f64, max_magnitude: f64, half_width: usize) -> usize {
    if max_magnitude <= 0.0 {
        return 0;
    }
    let ratio = (score.abs() / max_magnitude).min(1.0);
    (ratio * half_width as f64).round() as usize
}

/// Bar drawn around a central axis: negative scores grow left, positive right.
/// Returns (left side, right side), each exactly `half_width` chars.
pub fn signed_bar(score: f64, max_magnitude: f64, half_width: usize) -> (String, String) {
    let filled = bar_cells(score, max_magnitude, half_width);
    let empty = half_width - filled;
    if score < 0.0 {
        (
            format!("{}{}", " ".repeat(empty), "█".repeat(filled)),
            " ".repeat(half_width),
        )
    } else {
        (
            " ".repeat(half_width),
            format!("{}{}", "█".repeat(filled), " ".repeat(empty)),
        )
    }
}

pub fn format_decision(decision: Decision, use_colors: bool) -> String {
    if !use_colors {
        return format!("Prediction: {}", decision.label());
    }
    if decision.is_approved() {
        format!("Prediction: {}", decision.label().green().bold())
    } else {
        format!("Prediction: {}", decision.label().red().bold())
    }
}

/// Chart of the displayed contributions, one line per feature.
///
/// Format: "{rank}. {feature}  {bar}│{bar}  {score}  {value}"
pub fn format_contribution_chart(explanation: &Explanation, use_colors: bool) -> String {
    if explanation.is_empty() {
        return "No feature contributions returned.".to_string();
    }

    let displayed = explanation.displayed();
    let max_magnitude = explanation.max_magnitude();
    let label_width = displayed
        .iter()
        .map(|c| c.feature.chars().count().min(MAX_LABEL_WIDTH))
        .max()
        .unwrap_or(0);

    // Index(4) + label + gaps(2+2+2) + axis(1) + score(8) + value(~10)
    let fixed_width = 4 + label_width + 6 + 1 + 8 + 10;
    let half_width = match get_terminal_width() {
        Some(width) if width > fixed_width + 10 => ((width - fixed_width) / 2).min(DEFAULT_HALF_WIDTH),
        Some(_) => 5,
        None => DEFAULT_HALF_WIDTH,
    };

    let mut lines: Vec<String> = displayed
        .iter()
        .enumerate()
        .map(|(idx, c)| format_chart_line(idx, c, label_width, max_magnitude, half_width, use_colors))
        .collect();

    let hidden = explanation.hidden_count();
    if hidden > 0 {
        lines.push(format!("(+{} more not shown)", hidden));
    }

    lines.join("\n")
}

fn format_chart_line(
    idx: usize,
    contribution: &RankedContribution,
    label_width: usize,
    max_magnitude: f64,
    half_width: usize,
    use_colors: bool,
) -> String {
    let index_str = format!("{:>2}.", idx + 1);
    let label = truncate_label(&contribution.feature, MAX_LABEL_WIDTH);
    let label_padded = format!("{:<width$}", label, width = label_width);
    let (left, right) = signed_bar(contribution.score, max_magnitude, half_width);
    let score = format!("{:>8}", format_score(contribution.score));
    let value = contribution
        .value
        .as_ref()
        .map(|v| format!("  {}", format_value(v)))
        .unwrap_or_default();

    if use_colors {
        format!(
            "{} {}  {}│{}  {}{}",
            index_str.dimmed(),
            label_padded.bold(),
            left.red(),
            right.green(),
            score,
            value.cyan()
        )
    } else {
        format!("{} {}  {}│{}  {}{}", index_str, label_padded, left, right, score, value)
    }
}

/// Decision label followed by the contribution chart
pub fn format_assessment(account: AccountId, result: &AssessmentResult, use_colors: bool) -> String {
    let explanation = result.explain();
    format!(
        "Account: {}\n{}\n\nTop Feature Impacts:\n{}",
        account,
        format_decision(result.decision, use_colors),
        format_contribution_chart(&explanation, use_colors)
    )
}

/// Stored assessment: decision, account, age, then the chart
pub fn format_stored_assessment(assessment_id: u64, stored: &StoredAssessment, use_colors: bool) -> String {
    let age = format_age(chrono::Utc::now() - stored.created_at);
    let header = format!(
        "Assessment #{} for account {} ({} ago)",
        assessment_id, stored.account, age
    );
    let header = if use_colors {
        header.bold().to_string()
    } else {
        header
    };
    format!(
        "{}\n{}\n\nFeature Impacts:\n{}",
        header,
        format_decision(stored.decision, use_colors),
        format_contribution_chart(&stored.explain(), use_colors)
    )
}

/// Format the displayed contributions as tab-separated values for scripting
/// Columns: feature, score, value (no headers, no colors)
pub fn format_tsv(explanation: &Explanation) -> String {
    explanation
        .displayed()
        .iter()
        .map(|c| {
            format!(
                "{}\t{}\t{}",
                c.feature,
                c.score,
                c.value.as_ref().map(format_value).unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_submission(submission: &Submission, use_colors: bool) -> String {
    if use_colors {
        format!(
            "{}\nAccount number: {}",
            "Record inserted".green().bold(),
            submission.account.bold()
        )
    } else {
        format!("Record inserted\nAccount number: {}", submission.account)
    }
}

/// Applicant fields, one per line: name, value, kind
pub fn format_record(record: &ApplicantRecord, use_colors: bool) -> String {
    let name_width = record.iter().map(|(spec, _)| spec.name.len()).max().unwrap_or(0);

    record
        .iter()
        .map(|(spec, value)| {
            let name = format!("{:<width$}", spec.name, width = name_width);
            let value = format!("{:>8}", value.to_string());
            if use_colors {
                format!("{}  {}  {}", name.bold(), value, spec.kind.label().dimmed())
            } else {
                format!("{}  {}  {}", name, value, spec.kind.label())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CANONICAL_FIELDS;
    use chrono::Utc;
    use serde_json::json;

    fn scenario_b() -> AssessmentResult {
        AssessmentResult::from_parts(
            1.0,
            vec![
                "AMT_INCOME_TOTAL".to_string(),
                "age".to_string(),
                "CNT_CHILDREN".to_string(),
            ],
            vec![0.02, -0.55, 0.10],
            vec![json!(50000.0), json!(30), json!(0)],
        )
        .unwrap()
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!(50000.0)), "50000");
        assert_eq!(format_value(&json!(30)), "30");
        assert_eq!(format_value(&json!(1.25)), "1.25");
        assert_eq!(format_value(&json!("Laborers")), "Laborers");
        assert_eq!(format_value(&json!(null)), "null");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0.02), "+0.0200");
        assert_eq!(format_score(-0.55), "-0.5500");
    }

    #[test]
    fn test_signed_bar_directions() {
        let (left, right) = signed_bar(-0.5, 0.5, 4);
        assert_eq!(left, "████");
        assert_eq!(right, "    ");

        let (left, right) = signed_bar(0.25, 0.5, 4);
        assert_eq!(left, "    ");
        assert_eq!(right, "██  ");
    }

    #[test]
    fn test_signed_bar_zero_max() {
        let (left, right) = signed_bar(0.0, 0.0, 3);
        assert_eq!(left, "   ");
        assert_eq!(right, "   ");
    }

    #[test]
    fn test_chart_order_and_labels() {
        let chart = format_contribution_chart(&scenario_b().explain(), false);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(" 1. age"));
        assert!(lines[0].contains("-0.5500"));
        assert!(lines[0].ends_with("  30"));
        assert!(lines[1].starts_with(" 2. CNT_CHILDREN"));
        assert!(lines[2].starts_with(" 3. AMT_INCOME_TOTAL"));
        assert!(lines[2].ends_with("  50000"));
    }

    #[test]
    fn test_chart_empty() {
        let chart = format_contribution_chart(&Explanation::new(Vec::new()), false);
        assert_eq!(chart, "No feature contributions returned.");
    }

    #[test]
    fn test_chart_truncated_notice() {
        let contributions = (0..15)
            .map(|i| RankedContribution {
                feature: format!("f{}", i),
                score: i as f64,
                value: Some(json!(i)),
            })
            .collect();
        let chart = format_contribution_chart(&Explanation::new(contributions), false);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[10], "(+5 more not shown)");
    }

    #[test]
    fn test_format_assessment() {
        let output = format_assessment(AccountId(1042), &scenario_b(), false);
        assert!(output.starts_with("Account: 1042\nPrediction: Loan Approved"));
        assert!(output.contains("Top Feature Impacts:"));
    }

    #[test]
    fn test_format_tsv() {
        let tsv = format_tsv(&scenario_b().explain());
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines, vec!["age\t-0.55\t30", "CNT_CHILDREN\t0.1\t0", "AMT_INCOME_TOTAL\t0.02\t50000"]);
        assert_eq!(format_tsv(&Explanation::new(Vec::new())), "");
    }

    #[test]
    fn test_format_submission() {
        let submission = Submission {
            account: AccountId(1042),
            message: Some("Record inserted".to_string()),
        };
        assert_eq!(
            format_submission(&submission, false),
            "Record inserted\nAccount number: 1042"
        );
    }

    #[test]
    fn test_format_record() {
        let output = format_record(&ApplicantRecord::default(), false);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), CANONICAL_FIELDS.len());
        assert!(lines[0].starts_with("CODE_GENDER"));
        assert!(lines[4].contains("50000"));
        assert!(lines[4].ends_with("quantity"));
    }

    #[test]
    fn test_format_stored_assessment() {
        let stored = StoredAssessment {
            account: AccountId(3),
            decision: Decision::Rejected,
            scores: vec![0.1, -0.4],
            created_at: Utc::now() - Duration::hours(3),
        };
        let output = format_stored_assessment(12, &stored, false);
        assert!(output.starts_with("Assessment #12 for account 3 (3h ago)"));
        assert!(output.contains("Prediction: Rejected"));
        let chart_start = output.find("Feature Impacts:").unwrap();
        assert!(output[chart_start..].contains(" 1. feature_1"));
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Short", 20), "Short");
        assert_eq!(truncate_label("This is a very long label", 15), "This is a ve...");
        assert_eq!(truncate_label("Hello world", 3), "Hel");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::hours(3)), "3h");
        assert_eq!(format_age(Duration::days(2)), "2d");
        assert_eq!(format_age(Duration::weeks(2)), "2w");
        assert_eq!(format_age(Duration::minutes(30)), "30m");
        assert_eq!(format_age(Duration::seconds(30)), "now");
    }
}
