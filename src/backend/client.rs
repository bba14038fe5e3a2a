use anyhow::{Context, Result};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::BackendError;
use crate::config::Config;

/// Shown when the backend fails without saying why.
pub const GENERIC_FAILURE: &str = "The risk service reported an error";

/// HTTP handle on the credit-risk backend.
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// `timeout` of `None` means requests wait for as long as the backend takes.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid backend URL '{}'", base_url))?;
        // Url::join replaces the last segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("risk-lens/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to create HTTP client")?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Malformed(format!("invalid endpoint '{}': {}", path, e)))
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Create a client from the effective configuration
pub fn create_client(config: &Config) -> Result<BackendClient> {
    let timeout = config.timeout_duration()?;
    BackendClient::new(&config.backend_url, timeout).context("Failed to create backend client")
}

/// Decode a backend response.
///
/// An `error` string in the body always wins, whatever the status. A failing
/// status without one falls back to [`GENERIC_FAILURE`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(BackendError::Transport)?;
    let body: Option<Value> = serde_json::from_slice(&bytes).ok();

    if let Some(message) = body.as_ref().and_then(error_message) {
        return Err(BackendError::Server {
            status: Some(status.as_u16()),
            message,
        });
    }

    if !status.is_success() {
        return Err(BackendError::Server {
            status: Some(status.as_u16()),
            message: GENERIC_FAILURE.to_string(),
        });
    }

    let body = body.ok_or_else(|| BackendError::Malformed("response body is not JSON".to_string()))?;
    serde_json::from_value(body).map_err(|e| BackendError::Malformed(e.to_string()))
}

fn error_message(body: &Value) -> Option<String> {
    body.get("error")?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
