//! Admin login.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::info;
use validator::Validate;

use common::{AppError, AppResult};

use super::http::ApiClient;
use crate::config::PATH_ADMIN_LOGIN;
use crate::session::{AdminProfile, Session};
use crate::validation::ensure_valid;

/// Credentials posted to the admin login endpoint.
#[derive(Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }
}

/// Read `{token, admin}` from the top level or from under `data`.
pub fn parse_login_response(body: &Value) -> AppResult<Session> {
    let source = match body.get("data") {
        Some(data) if data.get("token").is_some() => data,
        _ => body,
    };
    let token = source
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::invalid_response("login response carried no token"))?;
    let admin = source
        .get("admin")
        .or_else(|| source.get("user"))
        .and_then(AdminProfile::from_value);

    Ok(Session::new(token, admin))
}

pub struct AuthClient {
    api: Arc<ApiClient>,
}

impl AuthClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Log in and persist the session.
    pub async fn login(&self, request: LoginRequest) -> AppResult<Session> {
        ensure_valid(&request)?;

        let body = self.api.post_public(PATH_ADMIN_LOGIN, &request).await?;
        let session = parse_login_response(&body)?;
        self.api.session().acquire(session.clone()).await?;

        info!(admin = %session.admin_label(), "Logged in");
        Ok(session)
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.api.session().invalidate().await
    }
}
