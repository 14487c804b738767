pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::profile::handlers as profile;
use crate::recommendations::handlers as recommendations;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Skill profile
        .route(
            "/api/v1/profile/skills",
            get(profile::handle_list_skills).post(profile::handle_create_skill),
        )
        .route(
            "/api/v1/profile/skills/:id",
            delete(profile::handle_delete_skill),
        )
        .route("/api/v1/profile/catalog", get(profile::handle_catalog))
        // Handoff + results
        .route(
            "/api/v1/recommendations/session",
            post(recommendations::handle_submit)
                .get(recommendations::handle_get_session)
                .delete(recommendations::handle_reset),
        )
        .route(
            "/api/v1/recommendations",
            get(recommendations::handle_recommendations),
        )
        // Per-project analysis
        .route(
            "/api/v1/recommendations/:project_id/analysis",
            post(analysis::handle_request_analysis)
                .get(analysis::handle_analysis_status)
                .delete(analysis::handle_invalidate_analysis),
        )
        .with_state(state)
}
