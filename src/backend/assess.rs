use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info};

use super::client::{read_json, BackendClient};
use super::types::{AssessRequest, AssessResponse, ExplanationResponse, RawScore, RetrainResponse};
use super::BackendError;
use crate::explain::types::check_finite;
use crate::explain::{AssessmentResult, Decision, MalformedResponse, StoredAssessment};
use crate::record::AccountId;

/// Request a fresh decision and explanation for an account.
pub async fn assess(client: &BackendClient, account: AccountId) -> Result<AssessmentResult, BackendError> {
    let url = client.endpoint("assess")?;
    debug!(%url, %account, "requesting assessment");

    let response = client
        .http()
        .post(url)
        .json(&AssessRequest { account_number: account })
        .send()
        .await
        .map_err(BackendError::Transport)?;

    let body: AssessResponse = read_json(response).await?;
    let scores = parse_scores(&body.shap_values)?;
    let result = AssessmentResult::from_parts(body.prediction, body.features, scores, body.feature_values)?;

    info!(
        %account,
        decision = %result.decision,
        features = result.contributions.len(),
        "assessment received"
    );
    Ok(result)
}

/// Fetch a stored assessment by its assessment id.
pub async fn fetch_explanation(client: &BackendClient, assessment_id: u64) -> Result<StoredAssessment, BackendError> {
    let url = client.endpoint(&format!("explanation/{}", assessment_id))?;
    debug!(%url, "fetching stored explanation");

    let response = client
        .http()
        .get(url)
        .send()
        .await
        .map_err(BackendError::Transport)?;

    let body: ExplanationResponse = read_json(response).await?;
    let scores = parse_scores(&body.shap_values)?;
    check_finite(&scores)?;
    let created_at = parse_timestamp(&body.created_at).ok_or_else(|| {
        BackendError::Malformed(format!("invalid created_at timestamp '{}'", body.created_at))
    })?;

    Ok(StoredAssessment {
        account: body.account_number,
        decision: Decision::from_prediction(body.prediction),
        scores,
        created_at,
    })
}

/// Ask the backend to retrain its model if enough assessments have accumulated.
/// Returns the backend's status message.
pub async fn retrain_if_needed(client: &BackendClient) -> Result<String, BackendError> {
    let url = client.endpoint("retrain-if-needed")?;
    debug!(%url, "requesting retrain");

    let response = client
        .http()
        .post(url)
        .send()
        .await
        .map_err(BackendError::Transport)?;

    let body: RetrainResponse = read_json(response).await?;
    Ok(body.message)
}

fn parse_scores(raw: &[RawScore]) -> Result<Vec<f64>, MalformedResponse> {
    raw.iter()
        .enumerate()
        .map(|(index, score)| {
            score.to_f64().ok_or_else(|| MalformedResponse::InvalidScore {
                index,
                raw: score.raw(),
            })
        })
        .collect()
}

/// ISO-8601 with an offset, or without one (taken as UTC).
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_with_offset() {
        let dt = parse_timestamp("2024-03-01T10:15:00+02:00").unwrap();
        assert_eq!(dt.hour(), 8);
    }

    #[test]
    fn test_parse_timestamp_naive() {
        let dt = parse_timestamp("2024-03-01T10:15:00.123456").unwrap();
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 10);

        let dt = parse_timestamp("2024-03-01T10:15:00").unwrap();
        assert_eq!(dt.minute(), 15);
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_scores_reports_index() {
        let raw = vec![RawScore::Number(0.1), RawScore::Text("oops".to_string())];
        let err = parse_scores(&raw).unwrap_err();
        assert_eq!(
            err,
            MalformedResponse::InvalidScore { index: 1, raw: "oops".to_string() }
        );
    }
}
