//! Service clients. The only code that talks to the inference service over HTTP.
//!
//! Both adapters share one `reqwest::Client` with a bounded per-call timeout.
//! They validate nothing; callers validate before building a request.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::recommendation::{
    AnalysisRequest, AnalysisResult, RecommendationRequest, RecommendationResult,
};

pub mod analysis;
pub mod recommendation;

pub use analysis::AnalysisClient;
pub use recommendation::RecommendationClient;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The analysis backend answered 501: no LLM service is configured.
    #[error("Analysis service not configured: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed (status {status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Coarse failure category recorded on a failed analysis entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    ServiceUnavailable,
    RequestFailed,
    TransportError,
}

impl ServiceError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ServiceError::ServiceUnavailable(_) => FailureKind::ServiceUnavailable,
            ServiceError::RequestFailed { .. } => FailureKind::RequestFailed,
            ServiceError::Transport(_) | ServiceError::Decode(_) => FailureKind::TransportError,
        }
    }
}

/// Produces ranked project recommendations for a submitted profile.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendationResult>, ServiceError>;
}

/// Produces a narrative fitness analysis for one profile/project pair.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ServiceError>;
}

/// Error bodies seen from the inference service: FastAPI uses `detail`,
/// the "not configured" path uses `error`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    detail: Option<serde_json::Value>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        self.error.or_else(|| {
            self.detail.map(|d| match d {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
        })
    }
}

/// Shared HTTP plumbing for both adapters.
#[derive(Clone)]
pub struct ServiceClient {
    client: Client,
    base_url: String,
}

impl ServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ServiceError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {url}");
        Ok(self.client.post(&url).json(body).send().await?)
    }
}

/// Extracts a human-readable message from an error response body.
async fn error_message(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::message)
        .unwrap_or(body);
    if message.trim().is_empty() {
        None
    } else {
        Some(message)
    }
}

/// Maps a non-success status to `RequestFailed`, otherwise decodes the JSON body.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        let message = error_message(response)
            .await
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
        warn!("Inference service returned {status}: {message}");
        return Err(ServiceError::RequestFailed {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

fn is_not_configured(status: StatusCode) -> bool {
    status == StatusCode::NOT_IMPLEMENTED
}
