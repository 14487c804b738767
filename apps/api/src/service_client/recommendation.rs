use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{decode, RecommendationService, ServiceClient, ServiceError};
use crate::models::recommendation::{RecommendationRequest, RecommendationResult};
use crate::models::skill::SkillMetadata;

const PREDICT_PATH: &str = "/predict/";

/// Wire body for `POST /predict/`. Skill ids and descriptions stay local.
#[derive(Debug, Serialize)]
struct PredictBody<'a> {
    skills: Vec<SkillMetadata>,
    description: &'a str,
    top_k: u32,
}

#[derive(Clone)]
pub struct RecommendationClient {
    inner: ServiceClient,
}

impl RecommendationClient {
    pub fn new(inner: ServiceClient) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl RecommendationService for RecommendationClient {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendationResult>, ServiceError> {
        let body = PredictBody {
            skills: request.skills.iter().map(|s| s.metadata()).collect(),
            description: &request.description,
            top_k: request.top_k,
        };

        let response = self.inner.post(PREDICT_PATH, &body).await?;
        let results: Vec<RecommendationResult> = decode(response).await?;

        debug!("Received {} recommendations", results.len());
        Ok(results)
    }
}
