use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::AccountId;

#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub account_number: AccountId,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssessRequest {
    pub account_number: AccountId,
}

#[derive(Debug, Deserialize)]
pub struct AssessResponse {
    pub prediction: f64,
    pub features: Vec<String>,
    pub shap_values: Vec<RawScore>,
    pub feature_values: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ExplanationResponse {
    pub account_number: AccountId,
    pub prediction: f64,
    pub shap_values: Vec<RawScore>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct RetrainResponse {
    pub message: String,
}

/// Contribution scores come back as numbers, though some backends stringify them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    Number(f64),
    Text(String),
}

impl RawScore {
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            RawScore::Number(n) => Some(*n),
            RawScore::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn raw(&self) -> String {
        match self {
            RawScore::Number(n) => n.to_string(),
            RawScore::Text(s) => s.clone(),
        }
    }
}

/// Result of a successful record submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub account: AccountId,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_score_variants() {
        let scores: Vec<RawScore> = serde_json::from_str(r#"[0.25, "-0.5", "abc", 3]"#).unwrap();
        assert_eq!(scores[0].to_f64(), Some(0.25));
        assert_eq!(scores[1].to_f64(), Some(-0.5));
        assert_eq!(scores[2].to_f64(), None);
        assert_eq!(scores[2].raw(), "abc");
        assert_eq!(scores[3].to_f64(), Some(3.0));
    }

    #[test]
    fn test_assess_request_body() {
        let body = serde_json::to_string(&AssessRequest { account_number: AccountId(1042) }).unwrap();
        assert_eq!(body, r#"{"account_number":1042}"#);
    }

    #[test]
    fn test_submit_response_ignores_extra_fields() {
        let resp: SubmitResponse =
            serde_json::from_str(r#"{"account_number": 7, "message": "Record inserted", "extra": true}"#)
                .unwrap();
        assert_eq!(resp.account_number, AccountId(7));
        assert_eq!(resp.message.as_deref(), Some("Record inserted"));

        let resp: SubmitResponse = serde_json::from_str(r#"{"account_number": 8}"#).unwrap();
        assert!(resp.message.is_none());
    }
}
