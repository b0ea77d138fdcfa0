//! Unified error handling for the admin console.
//!
//! Every backend failure is classified into one of these variants so that
//! callers can decide whether to degrade (forbidden, rate limited), surface
//! the server message (generic API errors) or stop (session expired).

use std::time::Duration;

use domain::DomainError;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Session expired")]
    SessionExpired,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access denied: {0}")]
    Forbidden(String),

    // Backend responses
    #[error("Too many requests")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // Transport
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),

    #[cfg(feature = "jwt")]
    #[error("Token error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Cannot move a user from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("Cancelled")]
    Cancelled,

    // Local state
    #[error("Session storage error: {0}")]
    Session(String),

    // Internal
    #[error("Internal error")]
    Internal(String),
}

impl AppError {
    /// Get error code for logs and JSON output
    pub fn code(&self) -> &'static str {
        match self {
            AppError::SessionExpired => "SESSION_EXPIRED",
            AppError::NotAuthenticated => "NOT_AUTHENTICATED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::RateLimited { .. } => "RATE_LIMITED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Api { .. } => "API_ERROR",
            AppError::InvalidResponse(_) => "INVALID_RESPONSE",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::Network(_) => "NETWORK_ERROR",
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => "TOKEN_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::Cancelled => "CANCELLED",
            AppError::Session(_) => "SESSION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status the error was classified from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::SessionExpired => Some(401),
            AppError::Forbidden(_) => Some(403),
            AppError::NotFound(_) => Some(404),
            AppError::RateLimited { .. } => Some(429),
            AppError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Errors that end the current flow and require a fresh login.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::SessionExpired | AppError::NotAuthenticated)
    }

    /// Errors worth retrying later without changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::RateLimited { .. } | AppError::Timeout(_) | AppError::Network(_)
        )
    }

    /// Get user-facing message with contextual guidance
    pub fn user_message(&self) -> String {
        match self {
            AppError::SessionExpired => {
                "Your session has expired. Run `sports-admin login` to sign in again.".to_string()
            }
            AppError::NotAuthenticated => {
                "You are not logged in. Run `sports-admin login` first.".to_string()
            }
            AppError::Forbidden(_) => {
                "You do not have permission to view this data. Please contact your administrator."
                    .to_string()
            }
            AppError::RateLimited { retry_after } => match retry_after {
                Some(wait) => format!(
                    "The server is receiving too many requests. Try again in {}s.",
                    wait.as_secs().max(1)
                ),
                None => "The server is receiving too many requests. Try again shortly.".to_string(),
            },
            // Server messages are shown verbatim
            AppError::Api { message, .. } => message.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Timeout(_) | AppError::Network(_) => {
                format!("{}. Check your connection and retry.", self)
            }

            // Hide details for internal errors
            #[cfg(feature = "jwt")]
            AppError::Jwt(e) => {
                tracing::error!("JWT error: {:?}", e);
                "The stored session token is unreadable. Please log in again.".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Use default message for others
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::MalformedRecord(msg) => AppError::InvalidResponse(msg),
            DomainError::InvalidTransition { from, to } => AppError::InvalidTransition { from, to },
            DomainError::NotFound(entity) => AppError::NotFound(entity),
        }
    }
}

// =============================================================================
// Client library conversions
// =============================================================================

#[cfg(feature = "http")]
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            AppError::Internal(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidResponse(err.to_string())
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: impl Into<String>) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: impl Into<String>) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(entity.into()))
    }
}

/// Convenience constructors
impl AppError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        AppError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        AppError::NotFound(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        AppError::InvalidResponse(msg.into())
    }

    pub fn session(msg: impl Into<String>) -> Self {
        AppError::Session(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
