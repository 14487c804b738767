use async_trait::async_trait;
use tracing::warn;

use super::{decode, error_message, is_not_configured, AnalysisService, ServiceClient, ServiceError};
use crate::models::recommendation::{AnalysisRequest, AnalysisResult};

const ANALYSIS_PATH: &str = "/analysis/";
const NOT_CONFIGURED_MESSAGE: &str = "Configure LLM Services";

#[derive(Clone)]
pub struct AnalysisClient {
    inner: ServiceClient,
}

impl AnalysisClient {
    pub fn new(inner: ServiceClient) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AnalysisService for AnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ServiceError> {
        let response = self.inner.post(ANALYSIS_PATH, request).await?;

        // Checked before generic status handling: the caller shows a different remedy.
        if is_not_configured(response.status()) {
            let message = error_message(response)
                .await
                .unwrap_or_else(|| NOT_CONFIGURED_MESSAGE.to_string());
            warn!("Analysis service not configured: {message}");
            return Err(ServiceError::ServiceUnavailable(message));
        }

        decode(response).await
    }
}
