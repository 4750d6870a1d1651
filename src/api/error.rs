//! Maps [`GateError`] to HTTP responses.

use crate::GateError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

impl GateError {
    /// HTTP status for this error.
    ///
    /// 400 for malformed input, 401 for authentication failures, 404 for
    /// empty or absent resources, 500 for everything server-side.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredentials | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthenticated | Self::SessionExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unexpected(_)
            | Self::MalformedSessionState(_)
            | Self::Upstream { .. }
            | Self::SessionStore(_)
            | Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body: `{"error": ...}`, plus an empty collection for listings.
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("error".to_string(), Value::String(self.to_string()));
        if let Self::NotFound {
            collection: Some(key),
            ..
        } = self
        {
            body.insert(key.to_string(), json!([]));
        }
        Value::Object(body)
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, detail = ?self, "internal server error");
        }

        (status, Json(self.body())).into_response()
    }
}
