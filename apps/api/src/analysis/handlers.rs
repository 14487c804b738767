//! Axum route handlers for per-project analysis.
//!
//! An analysis failure is reported as the project's state, never as an HTTP
//! error, so one project failing does not disturb the rest of the page.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisState, RequestOutcome};
use crate::errors::AppError;
use crate::models::recommendation::AnalysisRequest;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub project_id: String,
    /// True when the payload came from the cache without a network call.
    pub cached: bool,
    #[serde(flatten)]
    pub state: AnalysisState,
}

/// POST /api/v1/recommendations/:project_id/analysis
///
/// 200 with the settled state, or 202 while another request for the same
/// project is still in flight.
pub async fn handle_request_analysis(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<(StatusCode, Json<AnalysisResponse>), AppError> {
    let request = state.session.consume()?;
    let result = state.find_result(&project_id).ok_or_else(|| {
        AppError::NotFound(format!(
            "Project {project_id} is not among the current recommendations"
        ))
    })?;

    if request.skills.is_empty() || result.required_skills.is_empty() {
        return Err(AppError::Validation(
            "Employee skills and project skills are required".to_string(),
        ));
    }

    let build = move || AnalysisRequest::for_recommendation(&request, &result);
    let outcome = if query.refresh {
        state.analysis.refresh(&project_id, build).await
    } else {
        state.analysis.request(&project_id, build).await
    };

    let status = match outcome {
        RequestOutcome::AlreadyPending | RequestOutcome::Superseded => StatusCode::ACCEPTED,
        _ => StatusCode::OK,
    };
    let cached = matches!(outcome, RequestOutcome::Cached(_));

    Ok((
        status,
        Json(AnalysisResponse {
            state: state.analysis.status(&project_id),
            project_id,
            cached,
        }),
    ))
}

/// GET /api/v1/recommendations/:project_id/analysis
pub async fn handle_analysis_status(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Json<AnalysisResponse> {
    Json(AnalysisResponse {
        state: state.analysis.status(&project_id),
        project_id,
        cached: false,
    })
}

/// DELETE /api/v1/recommendations/:project_id/analysis
///
/// The view is no longer interested; any in-flight result will be discarded.
pub async fn handle_invalidate_analysis(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> StatusCode {
    state.analysis.invalidate(&project_id);
    StatusCode::NO_CONTENT
}
