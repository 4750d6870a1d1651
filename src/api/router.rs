//! Route definitions.

use super::handlers;
use super::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{MemoryStore, SessionManagerLayer};

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "awsgate.sid";

/// Builds the complete application router.
///
/// Each call creates its own in-memory session store; sessions do not survive
/// a restart.
pub fn build_router(state: AppState) -> Router {
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(state.config.cookie_secure)
        .with_http_only(true)
        .with_same_site(SameSite::Lax);

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api_routes())
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/ecs/clusters", get(handlers::list_clusters))
        .route(
            "/ecs/clusters/{cluster_name}/services",
            get(handlers::list_services),
        )
        .route("/s3/buckets", get(handlers::list_buckets))
        .route(
            "/s3/buckets/{bucket_name}/details",
            get(handlers::bucket_details),
        )
}
