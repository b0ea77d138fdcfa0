//! Approvals command - Pending registrations queue.
//!
//! ## Usage
//!
//! ```bash
//! sports-admin approvals list --role store --enrich
//! sports-admin approvals approve <id>
//! sports-admin approvals reject <id> --yes
//! sports-admin approvals watch --interval 30
//! ```

use std::time::Duration;

use chrono::Local;
use tracing::info;

use common::AppResult;
use domain::ApprovalDecision;

use super::output::{emit, render_view, OutputFormat};
use super::prompt::TerminalConfirm;
use crate::cli::args::{ApprovalsAction, ApprovalsArgs, DecisionArgs};
use crate::services::{AssumeYes, Confirm};
use crate::state::AppState;

/// Execute the approvals command
pub async fn execute(args: ApprovalsArgs, state: &AppState, format: OutputFormat) -> AppResult<()> {
    match args.action {
        ApprovalsAction::List { role, enrich } => {
            let view = state.approvals.pending_queue(enrich).await?;
            emit(format, &view, |view| render_view(view, role))
        }
        ApprovalsAction::Approve(target) => {
            decide(state, target, ApprovalDecision::Approve, format).await
        }
        ApprovalsAction::Reject(target) => {
            decide(state, target, ApprovalDecision::Reject, format).await
        }
        ApprovalsAction::Watch { interval, enrich } => {
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| state.config.poll.interval());
            watch(state, interval, enrich, format).await
        }
    }
}

async fn decide(
    state: &AppState,
    target: DecisionArgs,
    decision: ApprovalDecision,
    format: OutputFormat,
) -> AppResult<()> {
    let confirm: Box<dyn Confirm> = if target.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalConfirm)
    };

    let outcome = state
        .approvals
        .decide(&target.id, decision, confirm.as_ref())
        .await?;

    emit(format, &outcome, |outcome| {
        format!(
            "{} is now {}.\n\n{}",
            outcome.name,
            outcome.status,
            render_view(&outcome.queue, None)
        )
    })
}

async fn watch(
    state: &AppState,
    interval: Duration,
    enrich: bool,
    format: OutputFormat,
) -> AppResult<()> {
    info!(?interval, "Watching approvals queue. Press Ctrl+C to stop.");

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received shutdown signal, stopping watch...");
    };

    state
        .approvals
        .watch(
            interval,
            enrich,
            |result| {
                let stamp = Local::now().format("%H:%M:%S");
                match result {
                    Ok(view) => {
                        if format == OutputFormat::Table {
                            println!("== {} pending at {} ==", view.len(), stamp);
                        }
                        if let Err(e) = emit(format, view, |view| render_view(view, None)) {
                            tracing::error!("Failed to print queue: {}", e);
                        }
                    }
                    Err(e) => eprintln!("! Refresh at {} failed: {}", stamp, e.user_message()),
                }
            },
            shutdown,
        )
        .await?;
    Ok(())
}
