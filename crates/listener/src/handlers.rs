//! Endpoint handlers.
//!
//! Handlers only decode, delegate to [`deployer::DeploymentService`], and
//! encode. All rules live in the domain crate.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use deployer::{BuildRequest, BuildResult, ReviseRequest, ReviseResult, ServiceInfo};

use crate::response::{ApiError, HealthStatus};
use crate::AppState;

/// `GET /`
pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(state.info.as_ref().clone())
}

/// `GET /health`
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        service: deployer::SERVICE_SLUG.to_string(),
    })
}

/// `POST /build`
pub async fn build(
    State(state): State<AppState>,
    payload: Result<Json<BuildRequest>, JsonRejection>,
) -> Result<Json<BuildResult>, ApiError> {
    let Json(request) = payload?;
    let result = state.service.build(&request).await?;
    Ok(Json(result))
}

/// `POST /revise`
pub async fn revise(
    State(state): State<AppState>,
    payload: Result<Json<ReviseRequest>, JsonRejection>,
) -> Result<Json<ReviseResult>, ApiError> {
    let Json(request) = payload?;
    let result = state.service.revise(&request).await?;
    Ok(Json(result))
}
