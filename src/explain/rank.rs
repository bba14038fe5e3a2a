use std::cmp::Ordering;

use super::types::RankedContribution;

/// Number of contributions shown in a chart.
pub const DISPLAY_LIMIT: usize = 10;

/// Sort by descending absolute score.
///
/// The sort is stable: equal magnitudes keep their original relative order,
/// which also makes ranking an already ranked list a no-op.
pub fn rank_by_magnitude<T>(mut items: Vec<T>, score: impl Fn(&T) -> f64) -> Vec<T> {
    items.sort_by(|a, b| {
        score(b)
            .abs()
            .partial_cmp(&score(a).abs())
            .unwrap_or(Ordering::Equal)
    });
    items
}

/// A ranked explanation: every contribution is kept, only the head is displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    ranked: Vec<RankedContribution>,
}

impl Explanation {
    pub fn new(contributions: Vec<RankedContribution>) -> Self {
        Self {
            ranked: rank_by_magnitude(contributions, |c| c.score),
        }
    }

    /// All contributions, strongest first
    pub fn ranked(&self) -> &[RankedContribution] {
        &self.ranked
    }

    /// The first `min(N, DISPLAY_LIMIT)` contributions
    pub fn displayed(&self) -> &[RankedContribution] {
        &self.ranked[..self.ranked.len().min(DISPLAY_LIMIT)]
    }

    pub fn hidden_count(&self) -> usize {
        self.ranked.len().saturating_sub(DISPLAY_LIMIT)
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Largest magnitude among displayed entries, used to scale bars.
    pub fn max_magnitude(&self) -> f64 {
        self.displayed()
            .iter()
            .map(RankedContribution::magnitude)
            .fold(0.0_f64, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::AssessmentResult;
    use serde_json::json;

    fn contribution(feature: &str, score: f64) -> RankedContribution {
        RankedContribution {
            feature: feature.to_string(),
            score,
            value: Some(json!(0)),
        }
    }

    fn features(explanation: &[RankedContribution]) -> Vec<&str> {
        explanation.iter().map(|c| c.feature.as_str()).collect()
    }

    #[test]
    fn test_ranks_by_absolute_score() {
        let result = AssessmentResult::from_parts(
            1.0,
            vec![
                "AMT_INCOME_TOTAL".to_string(),
                "age".to_string(),
                "CNT_CHILDREN".to_string(),
            ],
            vec![0.02, -0.55, 0.10],
            vec![json!(50000), json!(30), json!(0)],
        )
        .unwrap();

        let explanation = result.explain();
        assert_eq!(
            features(explanation.displayed()),
            vec!["age", "CNT_CHILDREN", "AMT_INCOME_TOTAL"]
        );
        assert_eq!(explanation.displayed()[0].value, Some(json!(30)));
        assert_eq!(result.decision.label(), "Loan Approved");
    }

    #[test]
    fn test_adjacent_entries_are_non_increasing() {
        let scores = [0.3, -0.9, 0.0, 0.45, -0.45, 0.01, -0.2, 0.7, -0.05, 0.6, 0.33, -0.8];
        let contributions = scores
            .iter()
            .enumerate()
            .map(|(i, s)| contribution(&format!("f{}", i), *s))
            .collect();
        let explanation = Explanation::new(contributions);

        assert_eq!(explanation.ranked().len(), scores.len());
        for pair in explanation.ranked().windows(2) {
            assert!(pair[0].magnitude() >= pair[1].magnitude());
        }
    }

    #[test]
    fn test_ties_keep_original_order() {
        let explanation = Explanation::new(vec![
            contribution("first", 0.4),
            contribution("second", -0.4),
            contribution("big", 0.9),
            contribution("third", 0.4),
        ]);
        assert_eq!(
            features(explanation.ranked()),
            vec!["big", "first", "second", "third"]
        );
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let explanation = Explanation::new(vec![
            contribution("a", 0.1),
            contribution("b", -0.3),
            contribution("c", 0.3),
            contribution("d", 0.2),
        ]);
        let once = explanation.ranked().to_vec();
        let twice = rank_by_magnitude(once.clone(), |c| c.score);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_display_limit_truncates_to_ten() {
        let contributions = (0..15)
            .map(|i| contribution(&format!("f{}", i), i as f64 / 10.0))
            .collect();
        let explanation = Explanation::new(contributions);

        assert_eq!(explanation.ranked().len(), 15);
        assert_eq!(explanation.displayed().len(), DISPLAY_LIMIT);
        assert_eq!(explanation.hidden_count(), 5);
        assert_eq!(explanation.displayed()[0].feature, "f14");
        assert_eq!(explanation.displayed()[9].feature, "f5");
    }

    #[test]
    fn test_fewer_than_limit_shows_all() {
        let explanation = Explanation::new(vec![contribution("a", 0.5), contribution("b", 0.1)]);
        assert_eq!(explanation.displayed().len(), 2);
        assert_eq!(explanation.hidden_count(), 0);
    }

    #[test]
    fn test_empty_explanation() {
        let explanation = Explanation::new(Vec::new());
        assert!(explanation.is_empty());
        assert!(explanation.displayed().is_empty());
        assert_eq!(explanation.hidden_count(), 0);
        assert_eq!(explanation.max_magnitude(), 0.0);
    }

    #[test]
    fn test_max_magnitude_uses_displayed_entries() {
        let explanation = Explanation::new(vec![contribution("a", -0.7), contribution("b", 0.2)]);
        assert_eq!(explanation.max_magnitude(), 0.7);
    }
}
