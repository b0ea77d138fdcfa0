//! Terminal rendering for command results.
//!
//! Every renderer returns a `String` so commands stay thin and rendering can
//! be tested without capturing stdout.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use common::{AppError, AppResult};
use domain::{
    AggregatedView, DashboardSummary, RolePartition, ShopAnalytics, StoreLookup, SupportTicket,
    UserRecord, Warning,
};

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Print `value` as JSON, or the rendered table otherwise.
pub fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    render: impl FnOnce(&T) -> String,
) -> AppResult<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| AppError::internal(format!("Failed to encode output: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Table => print!("{}", render(value)),
    }
    Ok(())
}

fn date(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
}

fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

pub fn render_warnings(warnings: &[Warning]) -> String {
    let mut out = String::new();
    for warning in warnings {
        let _ = writeln!(out, "! {}", warning);
    }
    out
}

fn render_user_row(out: &mut String, user: &UserRecord) {
    let contact = user.email.as_deref().or(user.mobile.as_deref());
    let _ = writeln!(
        out,
        "  {:<26} {:<24} {:<30} {:<10} {}",
        user.id,
        user.display_name(),
        or_dash(contact),
        user.status.as_str(),
        date(user.created_at)
    );
}

/// Role collections as sections, optionally limited to one role.
pub fn render_view(view: &AggregatedView, only: Option<RolePartition>) -> String {
    let mut out = render_warnings(&view.warnings);
    for partition in RolePartition::ALL {
        if only.map(|o| o != partition).unwrap_or(false) {
            continue;
        }
        let users = view.collection(partition);
        let _ = writeln!(out, "{} ({})", partition.label(), users.len());
        for user in users {
            render_user_row(&mut out, user);
            if let Some(store) = user.extra_str("storeName") {
                let _ = writeln!(out, "    store: {}", store);
            }
        }
    }
    out
}

/// Full record of one user, including profile and documents.
pub fn render_user(user: &UserRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", user.display_name(), user.id);
    let _ = writeln!(out, "  Role:       {}", user.role);
    let _ = writeln!(out, "  Status:     {}", user.status);
    let _ = writeln!(out, "  Email:      {}", or_dash(user.email.as_deref()));
    let _ = writeln!(out, "  Mobile:     {}", or_dash(user.mobile.as_deref()));
    let _ = writeln!(out, "  Registered: {}", date(user.created_at));
    if let Some(location) = &user.location {
        let _ = writeln!(out, "  Location:   {}", location.summary());
    }

    if let (Some(profile), Some(partition)) = (&user.role_data, user.role.partition()) {
        let details = serde_json::to_value(profile.details(partition)).unwrap_or_default();
        if let Some(fields) = details.as_object() {
            let _ = writeln!(out, "  Profile:");
            for (key, value) in fields.iter().filter(|(key, _)| key.as_str() != "kind") {
                let shown = match value {
                    serde_json::Value::Null => continue,
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Array(items) if items.is_empty() => continue,
                    other => other.to_string(),
                };
                let _ = writeln!(out, "    {}: {}", key, shown);
            }
        }
    }

    if user.documents.is_empty() {
        let _ = writeln!(out, "  Documents:  none");
    } else {
        let _ = writeln!(out, "  Documents:");
        for (kind, document) in user.documents.iter() {
            let mark = if document.is_verified() { " (verified)" } else { "" };
            let _ = writeln!(out, "    {}{}: {}", kind, mark, document.links().join(", "));
        }
    }
    out
}

pub fn render_dashboard(summary: &DashboardSummary) -> String {
    let mut out = render_warnings(&summary.warnings);
    let _ = writeln!(out, "Users: {}", summary.total_users);
    for role in &summary.roles {
        let _ = writeln!(
            out,
            "  {:<18} {:>6}  {:>5.1}%",
            role.role.label(),
            role.count,
            role.percentage
        );
    }
    let _ = writeln!(out, "Pending approvals:   {}", summary.pending);
    let _ = writeln!(out, "Approval rate:       {:.1}%", summary.approval_rate);
    let _ = writeln!(out, "New in last 7 days:  {}", summary.recent_registrations);
    if !summary.statuses.is_empty() {
        let _ = writeln!(out, "By status:");
        for (status, count) in &summary.statuses {
            let _ = writeln!(out, "  {:<18} {:>6}", status, count);
        }
    }
    if let Some(shop) = &summary.shop {
        out.push_str(&render_analytics(shop));
    }
    out
}

pub fn render_analytics(analytics: &ShopAnalytics) -> String {
    let mut out = String::from("Shop:\n");
    let headline = analytics.headline();
    if headline.is_empty() {
        out.push_str("  no metrics reported\n");
    }
    for (label, value) in headline {
        let _ = writeln!(out, "  {:<18} {:>12}", label, number(value));
    }
    out
}

pub fn render_store_lookup(lookup: &StoreLookup) -> String {
    let mut out = String::new();
    match lookup {
        StoreLookup::Found(store) => {
            let _ = writeln!(
                out,
                "{} ({})",
                or_dash(store.store_name.as_deref()),
                or_dash(store.id.as_deref())
            );
            let _ = writeln!(out, "  Owner:    {}", or_dash(store.owner_name.as_deref()));
            let _ = writeln!(out, "  Status:   {}", or_dash(store.status.as_deref()));
            for (label, value) in [
                ("Products", store.total_products),
                ("Orders", store.total_orders),
                ("Revenue", store.total_revenue),
            ] {
                if let Some(value) = value {
                    let _ = writeln!(out, "  {:<9} {}", format!("{}:", label), number(value));
                }
            }
        }
        StoreLookup::NeedsRegistration => {
            out.push_str("This store has no shop yet. It must be registered before it can sell.\n");
        }
    }
    out
}

pub fn render_tickets(tickets: &[SupportTicket]) -> String {
    let mut out = format!("Tickets ({})\n", tickets.len());
    for ticket in tickets {
        let _ = writeln!(
            out,
            "  {:<26} {:<12} {:<8} {:<12} {}",
            ticket.id,
            ticket.status.as_str(),
            ticket.priority.as_str(),
            date(ticket.created_at),
            or_dash(ticket.subject.as_deref())
        );
    }
    out
}

pub fn render_ticket(ticket: &SupportTicket) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", or_dash(ticket.subject.as_deref()), ticket.id);
    let _ = writeln!(out, "  Status:    {}", ticket.status);
    let _ = writeln!(out, "  Priority:  {}", ticket.priority);
    let _ = writeln!(out, "  From:      {}", or_dash(ticket.requester.as_deref()));
    if let Some(category) = ticket.category.as_deref() {
        let _ = writeln!(out, "  Category:  {}", category);
    }
    let _ = writeln!(out, "  Opened:    {}", date(ticket.created_at));
    if let Some(message) = ticket.message.as_deref() {
        let _ = writeln!(out, "\n  {}", message);
    }
    for reply in &ticket.replies {
        let _ = writeln!(
            out,
            "\n  [{}] {}: {}",
            date(reply.created_at),
            or_dash(reply.from.as_deref()),
            or_dash(reply.message.as_deref())
        );
    }
    out
}
