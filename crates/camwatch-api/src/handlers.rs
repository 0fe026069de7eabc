//! JSON API handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

/// GET /api/v1/status
pub async fn status(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.scheduler.tracker().statuses().await)
}

fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
        .into_response()
}

/// GET /api/v1/status/{camera}
pub async fn camera_status(
    State(state): State<ApiState>,
    Path(camera): Path<String>,
) -> Response {
    let statuses = state.scheduler.tracker().statuses().await;
    match statuses.into_iter().find(|s| s.camera == camera) {
        Some(status) => ApiResponse::ok(status).into_response(),
        None => error_response(&format!("camera '{camera}' not found"), StatusCode::NOT_FOUND),
    }
}

/// GET /api/v1/history
pub async fn history(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.scheduler.tracker().history().await)
}

/// POST /api/v1/check
pub async fn check_now(State(state): State<ApiState>) -> impl IntoResponse {
    info!("on-demand check requested");
    ApiResponse::ok(state.scheduler.run_once().await)
}
