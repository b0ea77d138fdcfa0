//! Console workflows built on the backend clients.
//!
//! The aggregator and enricher are shared by the approvals queue, the
//! user-management view and the dashboard.

pub mod aggregator;
pub mod approvals;
pub mod dashboard;
pub mod enrichment;
pub mod shop;
pub mod support;
pub mod user_management;

pub use aggregator::{merge_results, AggregationMode, Aggregator};
pub use approvals::{ApprovalService, AssumeYes, Confirm, DecisionOutcome};
pub use dashboard::DashboardService;
pub use enrichment::{find_profile, Enricher};
pub use shop::ShopService;
pub use support::{SupportDesk, TicketReplyRequest};
pub use user_management::{UserDetail, UserFilter, UserManager};

#[cfg(any(test, feature = "test-utils"))]
pub use approvals::MockConfirm;
