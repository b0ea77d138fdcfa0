//! Users command - User management across every role.

use common::AppResult;

use super::output::{emit, render_user, render_view, render_warnings, OutputFormat};
use crate::cli::args::{UsersAction, UsersArgs};
use crate::services::UserFilter;
use crate::state::AppState;

/// Execute the users command
pub async fn execute(args: UsersArgs, state: &AppState, format: OutputFormat) -> AppResult<()> {
    match args.action {
        UsersAction::List {
            role,
            status,
            search,
        } => {
            let filter = UserFilter {
                role,
                status,
                search,
            };
            let view = state.users.list(&filter).await?;
            emit(format, &view, |view| render_view(view, filter.role))
        }
        UsersAction::Show { id } => {
            let detail = state.users.show(&id).await?;
            emit(format, &detail.user, |user| {
                format!("{}{}", render_warnings(&detail.warnings), render_user(user))
            })
        }
        UsersAction::SetStatus { id, status } => {
            let user = state.users.set_status(&id, status).await?;
            emit(format, &user, |user| {
                format!("{} is now {}.\n", user.display_name(), user.status)
            })
        }
    }
}
