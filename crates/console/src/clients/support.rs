//! Admin support ticket endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use common::AppResult;
use domain::{SupportTicket, TicketStatus, TicketUpdate};

use super::http::{resource_path, ApiClient};
use super::normalize::{extract_object, extract_records, parse_records};
use crate::config::PATH_SUPPORT_TICKETS;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SupportBackend: Send + Sync {
    /// List tickets, optionally filtered by status
    async fn list(&self, status: Option<TicketStatus>) -> AppResult<Vec<SupportTicket>>;

    /// Fetch one ticket with its replies
    async fn get(&self, id: &str) -> AppResult<SupportTicket>;

    /// Change status and/or priority
    async fn update(&self, id: &str, update: TicketUpdate) -> AppResult<()>;

    /// Post an admin reply
    async fn reply(&self, id: &str, message: String) -> AppResult<()>;
}

pub struct SupportClient {
    api: Arc<ApiClient>,
}

impl SupportClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    fn ticket_path(id: &str) -> String {
        resource_path(PATH_SUPPORT_TICKETS, id)
    }
}

/// Tickets come back as a bare array, `{data: [..]}` or `{tickets: [..]}`.
fn ticket_records(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut map) => match map.remove("tickets") {
            Some(Value::Array(items)) => items,
            _ => match map.remove("data") {
                Some(Value::Object(mut data)) => match data.remove("tickets") {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                },
                Some(other) => extract_records(other),
                None => Vec::new(),
            },
        },
        other => extract_records(other),
    }
}

#[async_trait]
impl SupportBackend for SupportClient {
    async fn list(&self, status: Option<TicketStatus>) -> AppResult<Vec<SupportTicket>> {
        let query: Vec<(&str, String)> = status
            .map(|s| vec![("status", s.to_string())])
            .unwrap_or_default();
        let body = self.api.get(PATH_SUPPORT_TICKETS, &query).await?;
        Ok(parse_records(
            ticket_records(body),
            "ticket",
            SupportTicket::from_value,
        ))
    }

    async fn get(&self, id: &str) -> AppResult<SupportTicket> {
        let body = self.api.get(&Self::ticket_path(id), &[]).await?;
        Ok(SupportTicket::from_value(extract_object(body))?)
    }

    async fn update(&self, id: &str, update: TicketUpdate) -> AppResult<()> {
        self.api.put(&Self::ticket_path(id), &update).await?;
        Ok(())
    }

    async fn reply(&self, id: &str, message: String) -> AppResult<()> {
        self.api
            .post(
                &format!("{}/reply", Self::ticket_path(id)),
                &json!({ "message": message }),
            )
            .await?;
        Ok(())
    }
}
