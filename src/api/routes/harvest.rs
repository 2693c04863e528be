//! Harvest handler

use crate::api::AppState;
use crate::error::ApiError;
use crate::types::HarvestRequest;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /harvest - Harvest every document linked from a page
///
/// Runs the whole batch before responding. Per-document failures are part of
/// the `200` report; only fatal conditions produce an error status.
#[utoipa::path(
    post,
    path = "/api/v1/harvest",
    tag = "harvest",
    request_body = HarvestRequest,
    responses(
        (status = 200, description = "Batch finished; per-item outcomes in the report", body = crate::types::BatchReport),
        (status = 400, description = "Missing or invalid URL", body = crate::error::ApiError),
        (status = 422, description = "No document links on the page", body = crate::error::ApiError),
        (status = 502, description = "Page could not be fetched", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn harvest(
    State(state): State<AppState>,
    payload: Result<Json<HarvestRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected harvest request body");
            return ApiError::validation(rejection.body_text()).into_response();
        }
    };

    match state.harvester.harvest_request(&request).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => e.into_response(),
    }
}
