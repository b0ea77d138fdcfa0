//! Shop command - Analytics and store lookups.

use common::AppResult;

use super::output::{emit, render_analytics, render_store_lookup, OutputFormat};
use crate::cli::args::{ShopAction, ShopArgs};
use crate::state::AppState;

/// Execute the shop command
pub async fn execute(args: ShopArgs, state: &AppState, format: OutputFormat) -> AppResult<()> {
    match args.action {
        ShopAction::Analytics => {
            let analytics = state.shop.analytics().await?;
            emit(format, &analytics, render_analytics)
        }
        ShopAction::Store { id } => {
            let lookup = state.shop.store_lookup(&id).await?;
            emit(format, &lookup, render_store_lookup)
        }
    }
}
