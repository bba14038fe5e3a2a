use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

use crate::record::{AccountId, CANONICAL_FIELDS};

/// Binary loan decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// The backend sends the model output as a number; exactly 1 means approved.
    pub fn from_prediction(prediction: f64) -> Self {
        if prediction == 1.0 {
            Decision::Approved
        } else {
            Decision::Rejected
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Decision::Approved => "Loan Approved",
            Decision::Rejected => "Rejected",
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Approved)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One explained feature: its name, signed contribution and raw input value.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedContribution {
    pub feature: String,
    pub score: f64,
    /// Raw feature value, absent for stored assessments which only keep scores
    pub value: Option<Value>,
}

impl RankedContribution {
    pub fn magnitude(&self) -> f64 {
        self.score.abs()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MalformedResponse {
    LengthMismatch {
        features: usize,
        scores: usize,
        values: usize,
    },
    InvalidScore {
        index: usize,
        raw: String,
    },
}

impl fmt::Display for MalformedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedResponse::LengthMismatch { features, scores, values } => write!(
                f,
                "misaligned explanation: {} features, {} scores, {} values",
                features, scores, values
            ),
            MalformedResponse::InvalidScore { index, raw } => {
                write!(f, "invalid contribution score at index {}: '{}'", index, raw)
            }
        }
    }
}

impl std::error::Error for MalformedResponse {}

/// Decision plus per-feature explanation for one account, in received order.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentResult {
    pub decision: Decision,
    pub contributions: Vec<RankedContribution>,
}

impl AssessmentResult {
    /// Zip the three parallel lists, rejecting anything not index-aligned.
    pub fn from_parts(
        prediction: f64,
        features: Vec<String>,
        scores: Vec<f64>,
        values: Vec<Value>,
    ) -> Result<Self, MalformedResponse> {
        if features.len() != scores.len() || features.len() != values.len() {
            return Err(MalformedResponse::LengthMismatch {
                features: features.len(),
                scores: scores.len(),
                values: values.len(),
            });
        }
        check_finite(&scores)?;

        let contributions = features
            .into_iter()
            .zip(scores)
            .zip(values)
            .map(|((feature, score), value)| RankedContribution {
                feature,
                score,
                value: Some(value),
            })
            .collect();

        Ok(Self {
            decision: Decision::from_prediction(prediction),
            contributions,
        })
    }

    pub fn explain(&self) -> super::Explanation {
        super::Explanation::new(self.contributions.clone())
    }
}

/// A previously computed assessment fetched by its assessment id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAssessment {
    pub account: AccountId,
    pub decision: Decision,
    pub scores: Vec<f64>,
    pub created_at: DateTime<Utc>,
}

impl StoredAssessment {
    /// Stored rows keep scores only; names come from the canonical field order
    /// when the counts line up, otherwise positional names are used.
    pub fn contributions(&self) -> Vec<RankedContribution> {
        let names = feature_names_for(self.scores.len());
        names
            .into_iter()
            .zip(self.scores.iter())
            .map(|(feature, &score)| RankedContribution {
                feature,
                score,
                value: None,
            })
            .collect()
    }

    pub fn explain(&self) -> super::Explanation {
        super::Explanation::new(self.contributions())
    }
}

pub(crate) fn check_finite(scores: &[f64]) -> Result<(), MalformedResponse> {
    match scores.iter().position(|s| !s.is_finite()) {
        Some(index) => Err(MalformedResponse::InvalidScore {
            index,
            raw: scores[index].to_string(),
        }),
        None => Ok(()),
    }
}

fn feature_names_for(count: usize) -> Vec<String> {
    if count == CANONICAL_FIELDS.len() {
        CANONICAL_FIELDS.iter().map(|f| f.name.to_string()).collect()
    } else {
        (0..count).map(|i| format!("feature_{}", i)).collect()
    }
}
