//! Domain-level constants.
//!
//! Wire values used by the backend for roles, statuses and document kinds.

// =============================================================================
// User Roles
// =============================================================================

/// Athlete accounts
pub const ROLE_PLAYER: &str = "player";

/// Coaching accounts
pub const ROLE_COACH: &str = "coach";

/// Store owners (the backend also uses "store" for this role)
pub const ROLE_SELLER: &str = "seller";

/// Alternative spelling of the seller role
pub const ROLE_STORE: &str = "store";

/// Delivery partners
pub const ROLE_DELIVERY: &str = "delivery";

/// Platform administrators
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// User Statuses
// =============================================================================

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_INACTIVE: &str = "inactive";
pub const STATUS_SUSPENDED: &str = "suspended";

// =============================================================================
// Documents
// =============================================================================

/// Key holding the free-form list of extra uploads
pub const ADDITIONAL_DOCS_KEY: &str = "additionalDocs";

// =============================================================================
// Dashboard
// =============================================================================

/// Window used for the "recent registrations" counter
pub const RECENT_REGISTRATION_DAYS: i64 = 7;
