use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::service_client::ServiceError;

/// Where callers are sent when the recommendation handoff is missing.
pub const PROFILE_FLOW_PATH: &str = "/api/v1/profile/skills";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The handoff slot is empty. Callers redirect to the profile flow.
    #[error("No recommendation request found; build one from the profile first")]
    MissingSessionData,

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::MissingSessionData => {
                let body = Json(json!({
                    "error": {
                        "code": "MISSING_SESSION_DATA",
                        "message": self.to_string(),
                        "redirect": PROFILE_FLOW_PATH
                    }
                }));
                return (
                    StatusCode::SEE_OTHER,
                    [(header::LOCATION, PROFILE_FLOW_PATH)],
                    body,
                )
                    .into_response();
            }
            AppError::Service(ServiceError::ServiceUnavailable(msg)) => (
                StatusCode::NOT_IMPLEMENTED,
                "SERVICE_UNAVAILABLE",
                msg.clone(),
            ),
            AppError::Service(e @ ServiceError::RequestFailed { .. }) => {
                tracing::error!("Upstream error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "Unable to fetch recommendations. Please try again.".to_string(),
                )
            }
            AppError::Service(e) => {
                tracing::error!("Transport error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "TRANSPORT_ERROR",
                    "Unable to reach the recommendation service. Please try again.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
