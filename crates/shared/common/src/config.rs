//! Shared configuration structures.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backend HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpClientConfig {
    /// Backend base URL (e.g., "http://localhost:5000")
    pub base_url: String,
    /// Default per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Timeout for dashboard/analytics calls in seconds
    pub analytics_timeout_secs: u64,
}

impl HttpClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn analytics_timeout(&self) -> Duration {
        Duration::from_secs(self.analytics_timeout_secs)
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 15,
            analytics_timeout_secs: 10,
        }
    }
}

/// Client-side request scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Maximum requests in flight at once
    pub max_concurrent: usize,
    /// Tokens available immediately
    pub burst: u32,
    /// Interval at which one token is returned to the bucket
    pub refill_interval_ms: u64,
}

impl SchedulerConfig {
    pub fn refill_interval(&self) -> Duration {
        Duration::from_millis(self.refill_interval_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            burst: 2,
            refill_interval_ms: 500,
        }
    }
}

/// Persisted admin session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Path of the JSON session file
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("session.json"),
        }
    }
}

/// Approvals queue polling and query sizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollConfig {
    /// Auto-refresh interval for the approvals queue in seconds
    pub interval_secs: u64,
    /// `limit` sent with the broad listing query
    pub broad_query_limit: u32,
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            broad_query_limit: 1000,
        }
    }
}
