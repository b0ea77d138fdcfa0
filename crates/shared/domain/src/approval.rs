//! Approval decisions and the status transitions they may cause.

use serde::Serialize;

use crate::error::{DomainError, DomainResult};
use crate::user::{UserRecord, UserStatus};

/// An admin's decision on a pending registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

impl ApprovalDecision {
    /// Status the user ends up in.
    pub fn target_status(&self) -> UserStatus {
        match self {
            ApprovalDecision::Approve => UserStatus::Active,
            ApprovalDecision::Reject => UserStatus::Rejected,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            ApprovalDecision::Approve => "approve",
            ApprovalDecision::Reject => "reject",
        }
    }

    /// Check that the decision applies to the user's current status.
    ///
    /// Only pending users sit in the approvals queue.
    pub fn check(&self, current: &UserStatus) -> DomainResult<UserStatus> {
        if current.is_pending() {
            Ok(self.target_status())
        } else {
            Err(DomainError::invalid_transition(
                current.to_string(),
                self.target_status().to_string(),
            ))
        }
    }

    pub fn check_user(&self, user: &UserRecord) -> DomainResult<UserStatus> {
        self.check(&user.status)
    }
}

impl std::fmt::Display for ApprovalDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.verb())
    }
}

/// Validate a status chosen from the user-management view.
///
/// Any known status may be set there; unknown values are rejected and a
/// no-op change is refused.
pub fn validate_admin_status(current: &UserStatus, target: &UserStatus) -> DomainResult<()> {
    if target.is_unknown() {
        return Err(DomainError::validation(format!(
            "Unknown status '{}'",
            target
        )));
    }
    if current == target {
        return Err(DomainError::invalid_transition(
            current.to_string(),
            target.to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_be_decided() {
        assert_eq!(
            ApprovalDecision::Approve.check(&UserStatus::Pending),
            Ok(UserStatus::Active)
        );
        assert_eq!(
            ApprovalDecision::Reject.check(&UserStatus::Pending),
            Ok(UserStatus::Rejected)
        );
    }

    #[test]
    fn test_terminal_states_are_final() {
        for status in [UserStatus::Active, UserStatus::Rejected, UserStatus::Suspended] {
            let err = ApprovalDecision::Approve.check(&status).unwrap_err();
            assert!(matches!(err, DomainError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn test_admin_status_validation() {
        assert!(validate_admin_status(&UserStatus::Active, &UserStatus::Suspended).is_ok());
        assert!(validate_admin_status(&UserStatus::Suspended, &UserStatus::Active).is_ok());
        assert!(validate_admin_status(&UserStatus::Active, &UserStatus::Active).is_err());
        assert!(validate_admin_status(
            &UserStatus::Active,
            &UserStatus::Unknown("banned".to_string())
        )
        .is_err());
    }
}
