//! Session scoping for stored documents.
//!
//! The cookie itself is managed by `tower-sessions`; this module decides which
//! `SessionKey` a request maps to and which cookie attributes the deployment needs.

use std::fmt;
use std::str::FromStr;

use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;

const SESSION_KEY_FIELD: &str = "documents_key";

/// Where generated documents are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionScope {
    /// One key per browser session (cookie).
    Session,
    /// One key for the whole process; every caller sees the latest generation.
    Process,
}

impl FromStr for SessionScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "session" => Ok(SessionScope::Session),
            "process" => Ok(SessionScope::Process),
            other => Err(format!("expected 'session' or 'process', got '{other}'")),
        }
    }
}

/// Identity under which a caller's documents are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey(Uuid);

impl SessionKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The single shared key used in `SessionScope::Process`.
    pub const fn process() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for SessionKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Returns the caller's key, creating and persisting one in the session if needed.
pub async fn session_key_or_create(
    session: &Session,
    scope: SessionScope,
) -> Result<SessionKey, AppError> {
    if scope == SessionScope::Process {
        return Ok(SessionKey::process());
    }

    if let Some(id) = session.get::<Uuid>(SESSION_KEY_FIELD).await? {
        return Ok(SessionKey(id));
    }

    let key = SessionKey::new();
    session.insert(SESSION_KEY_FIELD, key.0).await?;
    Ok(key)
}

/// Returns the caller's key without creating one. `None` means nothing was ever stored.
pub async fn existing_session_key(
    session: &Session,
    scope: SessionScope,
) -> Result<Option<SessionKey>, AppError> {
    if scope == SessionScope::Process {
        return Ok(Some(SessionKey::process()));
    }

    Ok(session.get::<Uuid>(SESSION_KEY_FIELD).await?.map(SessionKey))
}

/// Cookie-backed session layer. Sessions expire after `session_ttl` of inactivity.
///
/// With listed CORS origins the frontend lives on another site, so the cookie is
/// `SameSite=None; Secure`; browsers withhold anything stricter on cross-site fetches.
pub fn create_session_layer(config: &Config) -> SessionManagerLayer<MemoryStore> {
    let idle = Duration::try_from(config.session_ttl).unwrap_or(Duration::MAX);
    let layer = SessionManagerLayer::new(MemoryStore::default())
        .with_expiry(Expiry::OnInactivity(idle));

    if config.cors_allowed_origins.is_some() {
        layer.with_same_site(SameSite::None).with_secure(true)
    } else {
        layer.with_secure(false) // same-origin frontends may be served over plain HTTP
    }
}
