//! Recommendation handoff: a single transient slot carrying one submitted
//! request from the profile flow to the results flow.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::recommendation::RecommendationRequest;
use crate::models::skill::SkillRecord;
use crate::storage::KeyValueStore;

pub const HANDOFF_STORAGE_KEY: &str = "recommendationRequest";

/// Used when no skill on the profile carries a description.
pub const DESCRIPTION_PLACEHOLDER: &str = "No description provided";

const DESCRIPTION_SEPARATOR: &str = ". ";

#[derive(Clone)]
pub struct RecommendationSession {
    storage: Arc<dyn KeyValueStore>,
    top_k: u32,
}

impl RecommendationSession {
    pub fn new(storage: Arc<dyn KeyValueStore>, top_k: u32) -> Self {
        Self { storage, top_k }
    }

    /// Packages `skills` into a request and overwrites the handoff slot.
    pub fn submit(&self, skills: &[SkillRecord]) -> Result<RecommendationRequest, AppError> {
        if skills.is_empty() {
            return Err(AppError::Validation(
                "Please add some skills before generating recommendations.".to_string(),
            ));
        }

        let request = RecommendationRequest {
            skills: skills.to_vec(),
            description: build_description(skills),
            top_k: self.top_k,
        };

        match serde_json::to_string(&request) {
            Ok(json) => {
                if let Err(e) = self.storage.set(HANDOFF_STORAGE_KEY, &json) {
                    warn!("Failed to write recommendation handoff: {e}");
                }
            }
            Err(e) => warn!("Failed to serialize recommendation handoff: {e}"),
        }

        debug!(
            "Submitted recommendation request with {} skills, top_k={}",
            request.skills.len(),
            request.top_k
        );
        Ok(request)
    }

    /// Reads the handoff slot without clearing it, so a reload sees the same request.
    pub fn consume(&self) -> Result<RecommendationRequest, AppError> {
        let raw = match self.storage.get(HANDOFF_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Err(AppError::MissingSessionData),
            Err(e) => {
                warn!("Failed to read recommendation handoff: {e}");
                return Err(AppError::MissingSessionData);
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            warn!("Discarding unreadable recommendation handoff: {e}");
            AppError::MissingSessionData
        })
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(HANDOFF_STORAGE_KEY) {
            warn!("Failed to clear recommendation handoff: {e}");
        }
    }
}

/// Joins every non-empty skill description with `". "`.
pub fn build_description(skills: &[SkillRecord]) -> String {
    let joined = skills
        .iter()
        .filter_map(|s| s.description.as_deref())
        .filter(|d| !d.is_empty())
        .collect::<Vec<_>>()
        .join(DESCRIPTION_SEPARATOR);

    if joined.is_empty() {
        DESCRIPTION_PLACEHOLDER.to_string()
    } else {
        joined
    }
}
