//! Admin session persistence.
//!
//! The session (`{token, admin}`) is the only state shared between backend
//! calls. It is read by every authenticated request and cleared on a 401 or
//! an explicit logout.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use common::{AppError, AppResult};
use domain::record::{record_id, scalar_string};

/// Profile of the logged-in admin as returned by the login endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl AdminProfile {
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            id: record_id(map),
            name: map.get("name").and_then(scalar_string),
            email: map.get("email").and_then(scalar_string),
            role: map.get("role").and_then(scalar_string),
        })
    }
}

/// Persisted admin session.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_in_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("admin", &self.admin)
            .field("logged_in_at", &self.logged_in_at)
            .finish()
    }
}

/// Only the expiry is read from the token.
#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

impl Session {
    pub fn new(token: impl Into<String>, admin: Option<AdminProfile>) -> Self {
        Self {
            token: token.into(),
            admin,
            logged_in_at: Some(Utc::now()),
        }
    }

    /// Expiry from the JWT `exp` claim.
    ///
    /// The signature is not verified; the backend remains the authority and
    /// this only avoids sending a token that is known to be stale.
    pub fn expires_at(&self) -> AppResult<Option<DateTime<Utc>>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<ExpiryClaims>(&self.token, &DecodingKey::from_secret(&[]), &validation)?;
        Ok(data
            .claims
            .exp
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single()))
    }

    /// Whether the token is known to have expired at `now`.
    ///
    /// Opaque (non-JWT) tokens are never considered expired locally.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Ok(Some(expiry)) => expiry <= now,
            Ok(None) => false,
            Err(e) => {
                debug!("Token expiry unreadable, deferring to backend: {}", e);
                false
            }
        }
    }

    pub fn admin_label(&self) -> String {
        self.admin
            .as_ref()
            .and_then(|a| a.name.clone().or_else(|| a.email.clone()))
            .unwrap_or_else(|| "admin".to_string())
    }
}

/// Session provider trait.
///
/// Centralizes token access so that no call site reads storage directly.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current session, if any
    async fn current(&self) -> AppResult<Option<Session>>;

    /// Store a freshly acquired session
    async fn acquire(&self, session: Session) -> AppResult<()>;

    /// Drop the session (logout or 401)
    async fn invalidate(&self) -> AppResult<()>;

    /// Bearer token for an authenticated call.
    ///
    /// A locally expired token is invalidated and reported as
    /// `SessionExpired` without contacting the backend.
    async fn token(&self) -> AppResult<String> {
        let session = self.current().await?.ok_or(AppError::NotAuthenticated)?;
        if session.is_expired(Utc::now()) {
            warn!("Stored session token has expired");
            self.invalidate().await?;
            return Err(AppError::SessionExpired);
        }
        Ok(session.token)
    }
}

enum Cached {
    Unloaded,
    Loaded(Option<Session>),
}

/// Session stored as JSON on disk, read once and cached in memory.
pub struct FileSessionStore {
    path: PathBuf,
    cache: Mutex<Cached>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(Cached::Unloaded),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> AppResult<Option<Session>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::session(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match serde_json::from_str::<Session>(&contents) {
            Ok(session) if !session.token.trim().is_empty() => Ok(Some(session)),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!(path = %self.path.display(), "Ignoring unreadable session file: {}", e);
                Ok(None)
            }
        }
    }

    async fn write_file(&self, session: &Session) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::session(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| AppError::internal(format!("Failed to encode session: {}", e)))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| AppError::session(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl SessionProvider for FileSessionStore {
    async fn current(&self) -> AppResult<Option<Session>> {
        let mut cache = self.cache.lock().await;
        if let Cached::Loaded(session) = &*cache {
            return Ok(session.clone());
        }
        let session = self.read_file().await?;
        *cache = Cached::Loaded(session.clone());
        Ok(session)
    }

    async fn acquire(&self, session: Session) -> AppResult<()> {
        let mut cache = self.cache.lock().await;
        self.write_file(&session).await?;
        info!(admin = %session.admin_label(), "Session stored");
        *cache = Cached::Loaded(Some(session));
        Ok(())
    }

    async fn invalidate(&self) -> AppResult<()> {
        let mut cache = self.cache.lock().await;
        *cache = Cached::Loaded(None);
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::session(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// In-memory session, for embedding the library without touching disk.
#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }
}

#[async_trait]
impl SessionProvider for MemorySessionStore {
    async fn current(&self) -> AppResult<Option<Session>> {
        Ok(self.session.lock().await.clone())
    }

    async fn acquire(&self, session: Session) -> AppResult<()> {
        *self.session.lock().await = Some(session);
        Ok(())
    }

    async fn invalidate(&self) -> AppResult<()> {
        *self.session.lock().await = None;
        Ok(())
    }
}
