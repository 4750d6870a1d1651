//! Session state and the authorization gate.
//!
//! A [`SessionRecord`] is written once per successful login and lives in the
//! server-side session store, keyed by the client's cookie. [`check_session`]
//! is the gate every protected operation passes through; [`SessionState`]
//! wraps the store and owns the record's lifecycle:
//!
//! - **created** by [`SessionState::replace`] after a login succeeds
//! - **read** by [`SessionState::authorize`] on every protected request
//! - **replaced** wholesale by the next login
//! - **purged** when the gate detects expiry, or on logout
//!
//! # Security
//!
//! - Only the cookie's session id leaves the server; the record never does
//! - The session id is rotated on every login
//! - The caller's long-lived secret key is never part of the record

use crate::provider::{IssuedCredentials, SessionScope};
use crate::{GateError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Store key the record lives under.
pub const SESSION_RECORD_KEY: &str = "aws_session";

/// Temporary credentials plus the region they were issued for.
///
/// `expires_at` is kept as the ISO-8601 string reported at issuance so that a
/// corrupted value is detected by the gate rather than at deserialization.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl SessionRecord {
    /// Builds a record from freshly issued credentials.
    pub fn from_issued(issued: IssuedCredentials, region: impl Into<String>) -> Self {
        Self {
            access_key_id: issued.access_key_id,
            secret_access_key: issued.secret_access_key,
            session_token: issued.session_token,
            region: region.into(),
            expires_at: Some(format_expiry(issued.expiration)),
        }
    }

    /// Returns the session token.
    pub fn token(&self) -> &str {
        &self.session_token
    }

    /// Parses the stored expiration.
    ///
    /// Returns `Ok(None)` for records without an expiration.
    ///
    /// # Errors
    ///
    /// [`GateError::MalformedSessionState`] if the value is not RFC 3339.
    pub fn expiry(&self) -> Result<Option<DateTime<Utc>>> {
        self.expires_at
            .as_deref()
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|ts| ts.with_timezone(&Utc))
                    .map_err(|e| GateError::MalformedSessionState(format!("{}: {}", raw, e)))
            })
            .transpose()
    }
}

impl std::fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecord")
            .field("access_key_id", &self.access_key_id)
            .field("region", &self.region)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Renders an expiration the way it is stored and returned to clients.
pub fn format_expiry(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Proof that the gate let a request through.
///
/// Carries everything a handler needs to build session-scoped clients.
#[derive(Debug, Clone)]
pub struct Authorized {
    scope: SessionScope,
}

impl Authorized {
    /// Returns the provider scope for this session.
    pub fn scope(&self) -> &SessionScope {
        &self.scope
    }

    /// Returns the region the session was opened in.
    pub fn region(&self) -> &str {
        &self.scope.region
    }
}

/// The authorization gate.
///
/// Pure function of the stored record and the current instant. A session is
/// usable up to and including its expiration; it is expired only when `now`
/// is strictly after `expires_at`. Records without an expiration never expire.
///
/// # Errors
///
/// - [`GateError::Unauthenticated`]: no record
/// - [`GateError::MalformedSessionState`]: unparseable expiration
/// - [`GateError::SessionExpired`]: `now > expires_at`
///
/// # Example
///
/// ```
/// use awsgate::session::{check_session, SessionRecord};
/// use awsgate::GateError;
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
/// let record = SessionRecord {
///     access_key_id: "ASIA...".into(),
///     secret_access_key: "temp".into(),
///     session_token: "token".into(),
///     region: "us-east-1".into(),
///     expires_at: Some((now + Duration::seconds(3600)).to_rfc3339()),
/// };
///
/// assert!(check_session(Some(&record), now).is_ok());
/// assert!(matches!(
///     check_session(Some(&record), now + Duration::seconds(3601)),
///     Err(GateError::SessionExpired)
/// ));
/// assert!(matches!(check_session(None, now), Err(GateError::Unauthenticated)));
/// ```
pub fn check_session(record: Option<&SessionRecord>, now: DateTime<Utc>) -> Result<Authorized> {
    let record = record.ok_or(GateError::Unauthenticated)?;

    let expires_at = record.expiry()?;
    if let Some(expires_at) = expires_at {
        if now > expires_at {
            return Err(GateError::SessionExpired);
        }
    }

    Ok(Authorized {
        scope: SessionScope {
            access_key_id: record.access_key_id.clone(),
            secret_access_key: record.secret_access_key.clone(),
            session_token: record.session_token.clone(),
            region: record.region.clone(),
            expires_at,
        },
    })
}

/// Explicit handle on one client's server-side session.
///
/// Wraps the cookie-backed [`tower_sessions::Session`] so that handlers never
/// touch store keys directly.
#[derive(Debug, Clone)]
pub struct SessionState {
    inner: tower_sessions::Session,
}

impl SessionState {
    pub fn new(inner: tower_sessions::Session) -> Self {
        Self { inner }
    }

    /// Loads the stored record, if any.
    ///
    /// A record that no longer deserializes is treated as malformed state.
    pub async fn load(&self) -> Result<Option<SessionRecord>> {
        self.inner
            .get::<SessionRecord>(SESSION_RECORD_KEY)
            .await
            .map_err(|e| GateError::MalformedSessionState(e.to_string()))
    }

    /// Stores a record, replacing any previous one and rotating the session id.
    pub async fn replace(&self, record: &SessionRecord) -> Result<()> {
        self.inner.cycle_id().await?;
        self.inner.insert(SESSION_RECORD_KEY, record).await?;
        Ok(())
    }

    /// Removes the record and the whole session.
    pub async fn purge(&self) -> Result<()> {
        self.inner.flush().await?;
        Ok(())
    }

    /// Runs the gate against the stored record.
    ///
    /// An expired record is purged before the error is returned, so the
    /// next request sees [`GateError::Unauthenticated`].
    pub async fn authorize(&self, now: DateTime<Utc>) -> Result<Authorized> {
        let record = self.load().await?;

        match check_session(record.as_ref(), now) {
            Err(GateError::SessionExpired) => {
                tracing::info!("session expired, purging record");
                self.purge().await?;
                Err(GateError::SessionExpired)
            }
            other => other,
        }
    }
}
