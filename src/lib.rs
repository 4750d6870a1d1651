//! awsgate - session-gated HTTP backend for read-only AWS inventory.
//!
//! A client logs in once with long-lived AWS keys. The keys are verified,
//! exchanged for temporary session credentials, and discarded. Every later
//! request is authorized against the stored session and answered with
//! read-only inventory data from ECS and S3.
//!
//! # Features
//!
//! - **Session Gate**: every inventory route checks the session's expiration
//! - **Async/Await**: built on tokio and axum
//! - **Provider Seam**: AWS SDK in production, in-memory mock for tests
//! - **Lazy Pagination**: object listings are streamed page by page
//! - **Feature Flags**: optional provider compilation
//!
//! # Quick Start
//!
//! ```no_run
//! use awsgate::api::{build_router, AppState};
//! use awsgate::{factory, Config, ProviderType};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     awsgate::init();
//!
//!     let config = Config::new(ProviderType::Mock);
//!     let provider = Arc::from(factory::new_provider(config.clone())?);
//!     let app = build_router(AppState::new(config.clone(), provider));
//!
//!     let listener = tokio::net::TcpListener::bind(config.bind).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Routes
//!
//! | Method | Path | Gate |
//! |--------|------|------|
//! | POST | `/api/v1/login` | no |
//! | POST | `/api/v1/logout` | no |
//! | GET | `/api/v1/ecs/clusters` | yes |
//! | GET | `/api/v1/ecs/clusters/{cluster_name}/services` | yes |
//! | GET | `/api/v1/s3/buckets` | yes |
//! | GET | `/api/v1/s3/buckets/{bucket_name}/details` | yes |
//! | GET | `/health` | no |
//!
//! # Providers
//!
//! | Provider | Feature Flag | Notes |
//! |----------|-------------|-------|
//! | Mock | `mock` (default) | In-memory inventory |
//! | AWS | `aws` (default) | STS, ECS, S3 via the AWS SDK |

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod factory;
pub mod inventory;
pub mod model;
pub mod provider;
pub mod providers;
pub mod session;
pub mod validation;

pub use config::{Config, ProviderType};
pub use error::{GateError, ProviderError, Result};
pub use provider::Provider;

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the library.
///
/// Registers all compiled providers with the factory. Idempotent.
pub fn init() {
    INIT.call_once(providers::register_all);
}
