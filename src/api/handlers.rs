//! Route handlers.
//!
//! Protected handlers take [`Authorized`] as their first extractor so the
//! gate runs before path parsing or any provider call.

use super::dto::{
    BucketsResponse, ClustersResponse, HealthResponse, LoginResponse, MessageResponse,
    ServicesResponse,
};
use super::state::AppState;
use crate::auth::CredentialInput;
use crate::model::BucketDetail;
use crate::session::{Authorized, SessionState};
use crate::{inventory, validation, GateError, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

/// POST /api/v1/login
///
/// A failed attempt leaves any existing session untouched.
pub async fn login(
    State(state): State<AppState>,
    session: SessionState,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(body) = body.map_err(|e| GateError::InvalidRequest(e.body_text()))?;
    let input = CredentialInput::from_json(&body)?;

    let record = state.authenticator.login(input).await?;
    session.replace(&record).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        expires_at: record.expires_at,
    }))
}

/// POST /api/v1/logout
pub async fn logout(session: SessionState) -> Result<Json<MessageResponse>> {
    session.purge().await?;
    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

/// GET /api/v1/ecs/clusters
pub async fn list_clusters(
    auth: Authorized,
    State(state): State<AppState>,
) -> Result<Json<ClustersResponse>> {
    let compute = state
        .provider
        .compute(auth.scope())
        .await
        .map_err(|e| GateError::upstream("Failed to fetch clusters", e))?;

    let clusters = inventory::list_clusters(compute.as_ref()).await?;
    Ok(Json(ClustersResponse { clusters }))
}

/// GET /api/v1/ecs/clusters/{cluster_name}/services
pub async fn list_services(
    auth: Authorized,
    State(state): State<AppState>,
    Path(cluster_name): Path<String>,
) -> Result<Json<ServicesResponse>> {
    validation::validate_cluster_name(&cluster_name)?;

    let compute = state
        .provider
        .compute(auth.scope())
        .await
        .map_err(|e| GateError::upstream("Failed to fetch services", e))?;

    let services = inventory::list_services(compute.as_ref(), &cluster_name).await?;
    Ok(Json(ServicesResponse { services }))
}

/// GET /api/v1/s3/buckets
pub async fn list_buckets(
    auth: Authorized,
    State(state): State<AppState>,
) -> Result<Json<BucketsResponse>> {
    let storage = state
        .provider
        .storage(auth.scope())
        .await
        .map_err(|e| GateError::upstream("Failed to fetch bucket information", e))?;

    let buckets = inventory::list_buckets(storage.as_ref()).await?;
    Ok(Json(BucketsResponse { buckets }))
}

/// GET /api/v1/s3/buckets/{bucket_name}/details
pub async fn bucket_details(
    auth: Authorized,
    State(state): State<AppState>,
    Path(bucket_name): Path<String>,
) -> Result<Json<BucketDetail>> {
    validation::validate_bucket_name(&bucket_name)?;

    let storage = state
        .provider
        .storage(auth.scope())
        .await
        .map_err(|e| GateError::upstream("Failed to fetch bucket details", e))?;

    let detail = inventory::bucket_detail(storage.as_ref(), &bucket_name).await?;
    Ok(Json(detail))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    tracing::trace!(provider = state.provider.name(), "health check");
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
