pub mod assess;
pub mod client;
pub mod intake;
pub mod types;

pub use assess::{assess, fetch_explanation, retrain_if_needed};
pub use client::{create_client, BackendClient, GENERIC_FAILURE};
pub use intake::submit_record;
pub use types::Submission;

use std::fmt;

use crate::explain::MalformedResponse;

/// Why a single backend call failed. Every variant is terminal for that call only.
#[derive(Debug)]
pub enum BackendError {
    /// The request never reached the backend or the response never came back
    Transport(reqwest::Error),
    /// The backend answered with an error payload or a failing status
    Server { status: Option<u16>, message: String },
    /// The backend answered with something we cannot render safely
    Malformed(String),
}

impl BackendError {
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Transport(_))
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport(e) => write!(f, "Could not reach the risk service: {}", e),
            BackendError::Server { message, .. } => write!(f, "{}", message),
            BackendError::Malformed(msg) => write!(f, "Unexpected response from the risk service: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MalformedResponse> for BackendError {
    fn from(value: MalformedResponse) -> Self {
        BackendError::Malformed(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_displays_message_only() {
        let err = BackendError::Server {
            status: Some(404),
            message: "account not found".to_string(),
        };
        assert_eq!(err.to_string(), "account not found");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_malformed_from_misaligned_lists() {
        let err: BackendError = MalformedResponse::LengthMismatch {
            features: 3,
            scores: 2,
            values: 3,
        }
        .into();
        assert!(err.to_string().contains("3 features, 2 scores, 3 values"));
    }
}
