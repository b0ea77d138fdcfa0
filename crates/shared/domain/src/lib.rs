//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! user records and their merge rules, role profiles, documents, the
//! aggregated approvals view, approval transitions and dashboard counters.

pub mod approval;
pub mod constants;
pub mod dashboard;
pub mod documents;
pub mod error;
pub mod profile;
pub mod record;
pub mod shop;
pub mod ticket;
pub mod user;
pub mod view;

pub use approval::{validate_admin_status, ApprovalDecision};
pub use constants::*;
pub use dashboard::{DashboardSummary, RoleCount};
pub use documents::{DocumentValue, Documents};
pub use error::{DomainError, DomainResult};
pub use profile::{ProfileDetails, RolePartition, RoleProfile};
pub use shop::{ShopAnalytics, StoreLookup, StoreSummary};
pub use ticket::{SupportTicket, TicketPriority, TicketReply, TicketStatus, TicketUpdate};
pub use user::{Location, UserRecord, UserRole, UserStatus};
pub use view::{dedup_by_id, AggregatedView, Warning, WarningKind};
