//! Axum route handlers for the skill profile.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::skill::{SkillDraft, SkillLevel, SkillName, SkillRecord};
use crate::state::AppState;

/// Form payload for a new skill. `months` is signed so that negative input
/// gets a validation message instead of a decode rejection.
#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub skill_name: SkillName,
    pub level: SkillLevel,
    pub months: i64,
    #[serde(default)]
    pub description: String,
}

impl CreateSkillRequest {
    fn validate(self) -> Result<SkillDraft, AppError> {
        if self.months < 0 {
            return Err(AppError::Validation(
                "Months must be 0 or greater".to_string(),
            ));
        }
        let months = u32::try_from(self.months)
            .map_err(|_| AppError::Validation("Months is out of range".to_string()))?;
        if self.description.trim().is_empty() {
            return Err(AppError::Validation("Description is required".to_string()));
        }

        Ok(SkillDraft {
            skill_name: self.skill_name,
            level: self.level,
            months,
            description: Some(self.description),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub skills: Vec<&'static str>,
    pub levels: Vec<&'static str>,
}

/// GET /api/v1/profile/skills
pub async fn handle_list_skills(State(state): State<AppState>) -> Json<Vec<SkillRecord>> {
    Json(state.profile.lock().skills().to_vec())
}

/// POST /api/v1/profile/skills
pub async fn handle_create_skill(
    State(state): State<AppState>,
    Json(request): Json<CreateSkillRequest>,
) -> Result<(StatusCode, Json<SkillRecord>), AppError> {
    let draft = request.validate()?;
    let record = state.profile.lock().create(draft);
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/v1/profile/skills/:id
pub async fn handle_delete_skill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.profile.lock().delete(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Skill {id} not found")))
    }
}

/// GET /api/v1/profile/catalog
pub async fn handle_catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        skills: SkillName::ALL.iter().map(SkillName::as_str).collect(),
        levels: SkillLevel::ALL.iter().map(SkillLevel::as_str).collect(),
    })
}
