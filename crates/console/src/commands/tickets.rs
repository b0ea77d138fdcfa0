//! Tickets command - Support desk.

use common::AppResult;

use super::output::{emit, render_ticket, render_tickets, OutputFormat};
use crate::cli::args::{TicketsAction, TicketsArgs};
use crate::state::AppState;

/// Execute the tickets command
pub async fn execute(args: TicketsArgs, state: &AppState, format: OutputFormat) -> AppResult<()> {
    match args.action {
        TicketsAction::List { status } => {
            let tickets = state.support.list(status).await?;
            emit(format, &tickets, |tickets| render_tickets(tickets))
        }
        TicketsAction::Show { id } => {
            let ticket = state.support.show(&id).await?;
            emit(format, &ticket, render_ticket)
        }
        TicketsAction::Update {
            id,
            status,
            priority,
        } => {
            let ticket = state.support.update(&id, status, priority).await?;
            emit(format, &ticket, render_ticket)
        }
        TicketsAction::Reply { id, message } => {
            let ticket = state.support.reply(&id, &message).await?;
            emit(format, &ticket, render_ticket)
        }
    }
}
