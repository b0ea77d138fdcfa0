//! Dashboard command - Platform counts and shop analytics.

use chrono::Utc;

use common::AppResult;

use super::output::{emit, render_dashboard, OutputFormat};
use crate::state::AppState;

/// Execute the dashboard command
pub async fn execute(state: &AppState, format: OutputFormat) -> AppResult<()> {
    let summary = state.dashboard.summary(Utc::now()).await?;
    emit(format, &summary, render_dashboard)
}
