//! Application state shared across all handlers.

use crate::auth::Authenticator;
use crate::{Config, Provider};
use std::sync::Arc;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. Per-client session
/// data is not kept here; it lives in the cookie-backed session store.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Cloud provider that builds scoped clients
    pub provider: Arc<dyn Provider>,
    /// Login flow against the provider's identity service
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn Provider>) -> Self {
        let authenticator = Authenticator::new(
            provider.clone(),
            config.default_region.clone(),
            config.session_duration,
        );

        Self {
            config: Arc::new(config),
            provider,
            authenticator: Arc::new(authenticator),
        }
    }
}
