//! Axum route handlers for the recommendation handoff and the results view.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::AnalysisState;
use crate::errors::AppError;
use crate::models::recommendation::{ProjectSkill, RecommendationRequest, RecommendationResult};
use crate::models::skill::SkillRecord;
use crate::presentation::{
    display_of, format_experience, level_label, tier_of, truncate_description, ScoreTier,
    DESCRIPTION_PREVIEW_CHARS,
};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RequiredSkillView {
    pub skill_name: String,
    pub level: String,
    pub level_label: String,
    pub months: u32,
    pub experience: String,
}

impl From<&ProjectSkill> for RequiredSkillView {
    fn from(skill: &ProjectSkill) -> Self {
        Self {
            skill_name: skill.skill_name.clone(),
            level: skill.level.clone(),
            level_label: level_label(&skill.level).to_string(),
            months: skill.months,
            experience: format_experience(skill.months),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationView {
    pub rank: u32,
    pub project_id: String,
    pub score: f64,
    pub score_display: i64,
    pub score_tier: ScoreTier,
    pub description: String,
    pub description_preview: String,
    pub required_skills: Vec<RequiredSkillView>,
    pub analysis: AnalysisState,
}

#[derive(Debug, Serialize)]
pub struct EmployeeSkillView {
    #[serde(flatten)]
    pub skill: SkillRecord,
    pub level_label: String,
    pub experience: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub top_k: u32,
    pub skills: Vec<EmployeeSkillView>,
    pub recommendations: Vec<RecommendationView>,
}

/// POST /api/v1/recommendations/session
///
/// Snapshots the current profile into the handoff slot. Analyses from any
/// previous submission no longer apply and are dropped.
pub async fn handle_submit(
    State(state): State<AppState>,
) -> Result<Json<RecommendationRequest>, AppError> {
    let skills = state.profile.lock().skills().to_vec();
    let request = state.session.submit(&skills)?;

    state.analysis.clear();
    state.results.write().clear();

    info!(
        "Recommendation request stored ({} skills)",
        request.skills.len()
    );
    Ok(Json(request))
}

/// GET /api/v1/recommendations/session
pub async fn handle_get_session(
    State(state): State<AppState>,
) -> Result<Json<RecommendationRequest>, AppError> {
    Ok(Json(state.session.consume()?))
}

/// DELETE /api/v1/recommendations/session
///
/// Explicit reset: empties the handoff slot and forgets results and analyses.
pub async fn handle_reset(State(state): State<AppState>) -> StatusCode {
    state.session.clear();
    state.analysis.clear();
    state.results.write().clear();
    StatusCode::NO_CONTENT
}

/// GET /api/v1/recommendations
///
/// Fetches ranked projects for the handed-off request. Safe to reload: the
/// handoff is read, not taken, and cached analyses survive the reload.
pub async fn handle_recommendations(
    State(state): State<AppState>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let request = state.session.consume()?;
    let results = state.recommender.recommend(&request).await?;

    {
        // A submission that landed during the fetch owns the results now.
        let mut stored = state.results.write();
        if state.session.consume().ok().as_ref() == Some(&request) {
            *stored = results.clone();
        } else {
            debug!("Handoff changed during fetch; not storing stale results");
        }
    }

    let analyses = state.analysis.snapshot();
    let recommendations = results
        .iter()
        .map(|result| {
            let analysis = analyses
                .get(&result.project_id)
                .cloned()
                .unwrap_or(AnalysisState::NotRequested);
            build_view(result, analysis)
        })
        .collect();

    let skills = request
        .skills
        .iter()
        .map(|skill| EmployeeSkillView {
            skill: skill.clone(),
            level_label: level_label(skill.level.as_str()).to_string(),
            experience: format_experience(skill.months),
        })
        .collect();

    Ok(Json(RecommendationsResponse {
        top_k: request.top_k,
        skills,
        recommendations,
    }))
}

fn build_view(result: &RecommendationResult, analysis: AnalysisState) -> RecommendationView {
    RecommendationView {
        rank: result.rank,
        project_id: result.project_id.clone(),
        score: result.score,
        score_display: display_of(result.score),
        score_tier: tier_of(result.score),
        description: result.description.clone(),
        description_preview: truncate_description(
            &result.description,
            false,
            DESCRIPTION_PREVIEW_CHARS,
        ),
        required_skills: result.required_skills.iter().map(Into::into).collect(),
        analysis,
    }
}
