//! Support desk: ticket triage and replies.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use validator::Validate;

use common::{AppError, AppResult};
use domain::{SupportTicket, TicketPriority, TicketStatus, TicketUpdate};

use crate::clients::SupportBackend;
use crate::validation::ensure_valid;

/// Reply posted to a ticket thread.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct TicketReplyRequest {
    #[validate(length(min = 1, max = 2000, message = "Reply must be between 1 and 2000 characters"))]
    pub message: String,
}

impl TicketReplyRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into().trim().to_string(),
        }
    }
}

pub struct SupportDesk {
    backend: Arc<dyn SupportBackend>,
}

impl SupportDesk {
    pub fn new(backend: Arc<dyn SupportBackend>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, status: Option<TicketStatus>) -> AppResult<Vec<SupportTicket>> {
        let mut tickets = self.backend.list(status).await?;
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    pub async fn show(&self, ticket_id: &str) -> AppResult<SupportTicket> {
        self.backend.get(required(ticket_id)?).await
    }

    /// Change status (and optionally priority), returning the re-fetched ticket.
    pub async fn update(
        &self,
        ticket_id: &str,
        status: TicketStatus,
        priority: Option<TicketPriority>,
    ) -> AppResult<SupportTicket> {
        let ticket_id = required(ticket_id)?;
        if let TicketStatus::Unknown(raw) = &status {
            return Err(AppError::validation(format!("Unknown ticket status '{}'", raw)));
        }
        if let Some(TicketPriority::Unknown(raw)) = &priority {
            return Err(AppError::validation(format!("Unknown ticket priority '{}'", raw)));
        }

        self.backend
            .update(ticket_id, TicketUpdate { status: status.clone(), priority })
            .await?;
        info!(ticket_id, %status, "Ticket updated");

        self.backend.get(ticket_id).await
    }

    /// Post a reply, returning the re-fetched ticket.
    pub async fn reply(&self, ticket_id: &str, message: &str) -> AppResult<SupportTicket> {
        let ticket_id = required(ticket_id)?;
        let request = TicketReplyRequest::new(message);
        ensure_valid(&request)?;

        self.backend.reply(ticket_id, request.message).await?;
        info!(ticket_id, "Reply posted");

        self.backend.get(ticket_id).await
    }
}

fn required(ticket_id: &str) -> AppResult<&str> {
    let trimmed = ticket_id.trim();
    if trimmed.is_empty() {
        Err(AppError::validation("Ticket id is required"))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::clients::MockSupportBackend;

    fn ticket(id: &str, created_at: &str) -> SupportTicket {
        SupportTicket::from_value(json!({"_id": id, "createdAt": created_at})).unwrap()
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let mut backend = MockSupportBackend::new();
        backend.expect_list().returning(|_| {
            Ok(vec![
                ticket("old", "2024-01-01T00:00:00Z"),
                ticket("new", "2024-03-01T00:00:00Z"),
            ])
        });

        let tickets = SupportDesk::new(Arc::new(backend)).list(None).await.unwrap();

        let ids: Vec<_> = tickets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_empty_reply_is_not_sent() {
        let mut backend = MockSupportBackend::new();
        backend.expect_reply().times(0);

        let err = SupportDesk::new(Arc::new(backend))
            .reply("t1", "   ")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_refetches_ticket() {
        let mut backend = MockSupportBackend::new();
        backend
            .expect_update()
            .withf(|id, update| id == "t1" && update.status == TicketStatus::Resolved)
            .times(1)
            .returning(|_, _| Ok(()));
        backend
            .expect_get()
            .times(1)
            .returning(|id| Ok(ticket(id, "2024-01-01T00:00:00Z")));

        let ticket = SupportDesk::new(Arc::new(backend))
            .update(" t1 ", TicketStatus::Resolved, None)
            .await
            .unwrap();

        assert_eq!(ticket.id, "t1");
    }

    #[tokio::test]
    async fn test_unknown_status_is_rejected() {
        let mut backend = MockSupportBackend::new();
        backend.expect_update().times(0);

        let err = SupportDesk::new(Arc::new(backend))
            .update("t1", TicketStatus::Unknown("archived".to_string()), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }
}
