use tracing::{debug, info};

use super::client::{read_json, BackendClient};
use super::types::{SubmitResponse, Submission};
use super::BackendError;
use crate::record::ApplicantRecord;

/// Send the full applicant record to the intake endpoint.
///
/// The record is borrowed, so a failed submission leaves it intact for a retry.
pub async fn submit_record(
    client: &BackendClient,
    record: &ApplicantRecord,
) -> Result<Submission, BackendError> {
    let url = client.endpoint("submit-record")?;
    debug!(%url, fields = record.len(), "submitting applicant record");

    let response = client
        .http()
        .post(url)
        .json(record)
        .send()
        .await
        .map_err(BackendError::Transport)?;

    let body: SubmitResponse = read_json(response).await?;
    info!(account = %body.account_number, "record inserted");

    Ok(Submission {
        account: body.account_number,
        message: body.message,
    })
}
