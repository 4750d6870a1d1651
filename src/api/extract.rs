//! Extractors that put the session store and the gate in front of handlers.

use crate::session::{Authorized, SessionState};
use crate::GateError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;

impl<S> FromRequestParts<S> for SessionState
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = tower_sessions::Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| GateError::SessionStore(message.to_string()))?;

        Ok(SessionState::new(session))
    }
}

/// Running the gate as an extractor means a handler that takes
/// [`Authorized`] cannot execute without a live session.
impl<S> FromRequestParts<S> for Authorized
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = SessionState::from_request_parts(parts, state).await?;
        session.authorize(Utc::now()).await
    }
}
