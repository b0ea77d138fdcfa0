//! Console-wide constants
//!
//! Backend paths and defaults, kept in one place.

// =============================================================================
// Backend
// =============================================================================

/// Default backend base URL (for development)
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default timeout for dashboard/analytics calls in seconds
pub const DEFAULT_ANALYTICS_TIMEOUT_SECS: u64 = 10;

/// Header carrying the per-request correlation id
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

// =============================================================================
// Endpoints
// =============================================================================

pub const PATH_USERS: &str = "/api/users";
pub const PATH_COACHES: &str = "/api/coaches";
pub const PATH_STORES: &str = "/api/stores";
/// Only partners currently available are listed here
pub const PATH_DELIVERY_AVAILABLE: &str = "/api/delivery/available";
pub const PATH_ADMIN_LOGIN: &str = "/api/auth/admin/login";
pub const PATH_SHOP_ANALYTICS: &str = "/api/admin/shop/analytics";
pub const PATH_SHOP_STORES: &str = "/api/admin/shop/stores";
pub const PATH_SUPPORT_TICKETS: &str = "/api/admin/support/tickets";

// =============================================================================
// Scheduling
// =============================================================================

/// Maximum backend requests in flight
pub const DEFAULT_SCHEDULER_MAX_CONCURRENT: usize = 2;

/// Requests allowed back-to-back before throttling kicks in
pub const DEFAULT_SCHEDULER_BURST: u32 = 2;

/// One request token is returned every this many milliseconds
pub const DEFAULT_SCHEDULER_REFILL_MS: u64 = 500;

/// Concurrent user-detail fetches during enrichment
pub const ENRICHMENT_CONCURRENCY: usize = 4;

// =============================================================================
// Approvals
// =============================================================================

/// `limit` for the broad listing query
pub const DEFAULT_BROAD_QUERY_LIMIT: u32 = 1000;

/// Approvals queue auto-refresh interval in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

// =============================================================================
// Session
// =============================================================================

/// Directory under the user config dir holding console state
pub const CONFIG_DIR_NAME: &str = "sports-admin";

/// Session file name
pub const SESSION_FILE_NAME: &str = "session.json";
