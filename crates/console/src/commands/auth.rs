//! Session commands: login, logout, whoami.

use serde_json::json;

use common::{AppError, AppResult};

use super::output::{emit, OutputFormat};
use super::prompt::read_line;
use crate::cli::args::LoginArgs;
use crate::clients::LoginRequest;
use crate::state::AppState;

/// Execute the login command
pub async fn login(args: LoginArgs, state: &AppState, format: OutputFormat) -> AppResult<()> {
    let password = match args.password {
        Some(password) => password,
        None => read_line("Password: ")
            .map_err(|e| AppError::internal(format!("Failed to read password: {}", e)))?,
    };

    let session = state
        .auth
        .login(LoginRequest::new(args.email, password))
        .await?;

    emit(format, &json!({ "admin": session.admin }), |_| {
        format!("Logged in as {}\n", session.admin_label())
    })
}

/// Execute the logout command
pub async fn logout(state: &AppState) -> AppResult<()> {
    state.auth.logout().await?;
    println!("Logged out");
    Ok(())
}

/// Execute the whoami command
pub async fn whoami(state: &AppState, format: OutputFormat) -> AppResult<()> {
    let session = state
        .session
        .current()
        .await?
        .ok_or(AppError::NotAuthenticated)?;
    let expires_at = session.expires_at().ok().flatten();

    emit(
        format,
        &json!({ "admin": session.admin, "expiresAt": expires_at }),
        |_| {
            let mut out = format!("{}\n", session.admin_label());
            if let Some(email) = session.admin.as_ref().and_then(|a| a.email.as_deref()) {
                out.push_str(&format!("  Email:   {}\n", email));
            }
            if let Some(at) = expires_at {
                out.push_str(&format!("  Expires: {}\n", at.format("%Y-%m-%d %H:%M UTC")));
            }
            out
        },
    )
}
