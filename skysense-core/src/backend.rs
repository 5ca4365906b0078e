use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;
use tracing::debug;

use crate::model::{AnalysisPayload, AnalysisQuery};

/// Endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/analyze";

/// Why an analysis request did not produce a payload.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("request to analysis endpoint failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("analysis endpoint responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("analysis response did not match the expected schema: {0}")]
    Decode(#[source] serde_json::Error),
}

/// The remote service that turns a query into advice.
#[async_trait]
pub trait AnalysisBackend: Send + Sync + Debug {
    async fn analyze(&self, query: &AnalysisQuery) -> Result<AnalysisPayload, AnalysisError>;
}

#[derive(Debug, Clone)]
pub struct HttpAnalysisBackend {
    endpoint: String,
    http: Client,
}

impl HttpAnalysisBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), http: Client::new() }
    }

    /// Like [`HttpAnalysisBackend::new`], but requests give up after `timeout`.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint: endpoint.into(), http })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn analyze(&self, query: &AnalysisQuery) -> Result<AnalysisPayload, AnalysisError> {
        let res = self
            .http
            .get(&self.endpoint)
            .query(query)
            .send()
            .await
            .map_err(AnalysisError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(AnalysisError::Transport)?;
        debug!(%status, bytes = body.len(), "analysis endpoint responded");

        if !status.is_success() {
            return Err(AnalysisError::Status { status: status.as_u16(), body: truncate_body(&body) });
        }

        serde_json::from_str(&body).map_err(AnalysisError::Decode)
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
