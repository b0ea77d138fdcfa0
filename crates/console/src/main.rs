//! Sports Admin - Console entry point
//!
//! CLI-based entry point that dispatches to the admin commands.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use console_lib::{
    cli::{Cli, Commands},
    commands::{self, OutputFormat},
    AppState, ConsoleConfig,
};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (verbose mode sets debug level)
    init_tracing(cli.verbose);

    // Load configuration
    let mut config = ConsoleConfig::from_env();
    if let Some(api_url) = cli.api_url {
        config = config.with_base_url(api_url);
    }
    tracing::debug!(base_url = %config.http.base_url, "Configuration loaded");

    let format = OutputFormat::from_flag(cli.json);

    // Execute command
    let result = match AppState::new(config) {
        Ok(state) => match cli.command {
            Commands::Login(args) => commands::auth::login(args, &state, format).await,
            Commands::Logout => commands::auth::logout(&state).await,
            Commands::Whoami => commands::auth::whoami(&state, format).await,
            Commands::Approvals(args) => commands::approvals::execute(args, &state, format).await,
            Commands::Users(args) => commands::users::execute(args, &state, format).await,
            Commands::Dashboard => commands::dashboard::execute(&state, format).await,
            Commands::Shop(args) => commands::shop::execute(args, &state, format).await,
            Commands::Tickets(args) => commands::tickets::execute(args, &state, format).await,
        },
        Err(e) => Err(e),
    };

    // Handle errors
    if let Err(e) = result {
        tracing::debug!(code = e.code(), "Command failed: {}", e);
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
