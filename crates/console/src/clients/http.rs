//! Authenticated REST client for the backend.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};
use uuid::Uuid;

use common::{AppError, AppResult, HttpClientConfig};

use super::normalize::{classify, parse_retry_after};
use crate::config::REQUEST_ID_HEADER;
use crate::session::SessionProvider;

/// `collection/id` with `id` percent-encoded as a single path segment.
pub fn resource_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, urlencoding::encode(id))
}

/// Whether a call carries the admin bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Bearer,
    Public,
}

/// Thin wrapper around `reqwest` that attaches the session token, applies
/// per-call timeouts and classifies every response.
///
/// A 401 on an authenticated call clears the persisted session before
/// `SessionExpired` is returned.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    session: Arc<dyn SessionProvider>,
}

impl ApiClient {
    pub fn new(config: &HttpClientConfig, session: Arc<dyn SessionProvider>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sports-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> AppResult<Value> {
        self.execute(Method::GET, path, query, None, Auth::Bearer, self.timeout)
            .await
    }

    /// GET with a caller-chosen timeout (dashboard and analytics calls).
    pub async fn get_with_timeout(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> AppResult<Value> {
        self.execute(Method::GET, path, query, None, Auth::Bearer, timeout)
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AppResult<Value> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::PUT, path, &[], Some(body), Auth::Bearer, self.timeout)
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AppResult<Value> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::POST, path, &[], Some(body), Auth::Bearer, self.timeout)
            .await
    }

    /// POST without a token. A 401 here means bad credentials, not an
    /// expired session.
    pub async fn post_public<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<Value> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::POST, path, &[], Some(body), Auth::Public, self.timeout)
            .await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        auth: Auth,
        timeout: Duration,
    ) -> AppResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let request_id = Uuid::new_v4();

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .header(ACCEPT, "application/json");
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }
        if auth == Auth::Bearer {
            let token = self.session.token().await?;
            builder = builder.bearer_auth(token);
        }

        debug!(%request_id, %method, path, "Sending request");

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let retry_after = parse_retry_after(
                response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok()),
            );
            let text = response.text().await?;
            Ok::<_, AppError>((status, content_type, retry_after, text))
        };

        let (status, content_type, retry_after, text) =
            match tokio::time::timeout(timeout, exchange).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!(%request_id, path, ?timeout, "Request timed out");
                    return Err(AppError::Timeout(timeout));
                }
            };

        debug!(%request_id, path, status, "Received response");

        match classify(status, content_type.as_deref(), &text, retry_after) {
            Err(AppError::SessionExpired) if auth == Auth::Public => {
                Err(AppError::InvalidCredentials)
            }
            Err(AppError::SessionExpired) => {
                error!(%request_id, path, "Backend rejected the session token");
                self.session.invalidate().await?;
                Err(AppError::SessionExpired)
            }
            Err(e) => {
                debug!(%request_id, path, code = e.code(), "Request failed: {}", e);
                Err(e)
            }
            ok => ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_path_keeps_id_in_one_segment() {
        assert_eq!(resource_path("/api/users", "u1"), "/api/users/u1");
        assert_eq!(resource_path("/api/users", "a/b"), "/api/users/a%2Fb");
        assert_eq!(
            resource_path("/api/users", "x?status=active#top"),
            "/api/users/x%3Fstatus%3Dactive%23top"
        );
        assert_eq!(resource_path("/api/users", "../admin"), "/api/users/..%2Fadmin");
    }
}
