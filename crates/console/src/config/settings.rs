//! Console settings loaded from environment variables.

use std::env;
use std::path::PathBuf;

use common::{HttpClientConfig, PollConfig, SchedulerConfig, SessionConfig};

use super::constants::{
    CONFIG_DIR_NAME, DEFAULT_ANALYTICS_TIMEOUT_SECS, DEFAULT_API_BASE_URL,
    DEFAULT_BROAD_QUERY_LIMIT, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SCHEDULER_BURST, DEFAULT_SCHEDULER_MAX_CONCURRENT, DEFAULT_SCHEDULER_REFILL_MS,
    SESSION_FILE_NAME,
};

/// Console configuration.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub http: HttpClientConfig,
    pub scheduler: SchedulerConfig,
    pub session: SessionConfig,
    pub poll: PollConfig,
}

impl ConsoleConfig {
    /// Load configuration from environment variables (and `.env`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            http: HttpClientConfig {
                base_url: env::var("API_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
                request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS")
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
                analytics_timeout_secs: parse_var("ANALYTICS_TIMEOUT_SECS")
                    .unwrap_or(DEFAULT_ANALYTICS_TIMEOUT_SECS),
            },
            scheduler: SchedulerConfig {
                max_concurrent: parse_var("SCHEDULER_MAX_CONCURRENT")
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_SCHEDULER_MAX_CONCURRENT),
                burst: parse_var("SCHEDULER_BURST")
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_SCHEDULER_BURST),
                refill_interval_ms: parse_var("SCHEDULER_REFILL_MS")
                    .unwrap_or(DEFAULT_SCHEDULER_REFILL_MS),
            },
            session: SessionConfig {
                path: env::var("SESSION_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| default_session_path()),
            },
            poll: PollConfig {
                interval_secs: parse_var("APPROVALS_POLL_SECS")
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
                broad_query_limit: parse_var("PENDING_QUERY_LIMIT")
                    .unwrap_or(DEFAULT_BROAD_QUERY_LIMIT),
            },
        }
    }

    /// Point the console at a different backend (used by `--api-url`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.http.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            http: HttpClientConfig::default(),
            scheduler: SchedulerConfig::default(),
            session: SessionConfig {
                path: default_session_path(),
            },
            poll: PollConfig::default(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// `<config dir>/sports-admin/session.json`, or the working directory when
/// the platform has no config dir.
fn default_session_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .unwrap_or_default()
        .join(SESSION_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();

        assert_eq!(config.http.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.http.request_timeout_secs, 15);
        assert_eq!(config.http.analytics_timeout_secs, 10);
        assert_eq!(config.poll.interval_secs, 30);
        assert!(config.session.path.ends_with("session.json"));
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let config = ConsoleConfig::default().with_base_url("http://api.example.com/");
        assert_eq!(config.http.base_url, "http://api.example.com");
    }
}
