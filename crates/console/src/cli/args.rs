//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use std::fmt::Display;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use domain::{RolePartition, TicketPriority, TicketStatus, UserStatus};

/// Sports services admin console
#[derive(Parser, Debug)]
#[command(name = "sports-admin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend base URL
    #[arg(long, global = true, env = "API_BASE_URL")]
    pub api_url: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in as an administrator
    Login(LoginArgs),

    /// Clear the stored session
    Logout,

    /// Show the logged-in administrator
    Whoami,

    /// Review pending registrations
    Approvals(ApprovalsArgs),

    /// Manage users of every role
    Users(UsersArgs),

    /// Show platform counts and shop analytics
    Dashboard,

    /// Shop analytics and store lookups
    Shop(ShopArgs),

    /// Support tickets
    Tickets(TicketsArgs),
}

/// Arguments for the login command
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Admin email
    #[arg(short, long, env = "ADMIN_EMAIL")]
    pub email: String,

    /// Admin password (prompted when omitted)
    #[arg(short, long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Arguments for the approvals command
#[derive(Args, Debug)]
pub struct ApprovalsArgs {
    #[command(subcommand)]
    pub action: ApprovalsAction,
}

/// Approvals queue actions
#[derive(Subcommand, Debug)]
pub enum ApprovalsAction {
    /// List pending users by role
    List {
        /// Only show one role (player, coach, store, delivery)
        #[arg(short, long)]
        role: Option<RolePartition>,
        /// Attach role profiles and documents
        #[arg(long)]
        enrich: bool,
    },
    /// Approve a pending user
    Approve(DecisionArgs),
    /// Reject a pending user
    Reject(DecisionArgs),
    /// Refresh the queue periodically until Ctrl+C
    Watch {
        /// Seconds between refreshes (defaults to APPROVALS_POLL_SECS)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
        /// Attach role profiles and documents
        #[arg(long)]
        enrich: bool,
    },
}

/// Target of an approve/reject action
#[derive(Args, Debug)]
pub struct DecisionArgs {
    /// User id
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the users command
#[derive(Args, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub action: UsersAction,
}

/// User management actions
#[derive(Subcommand, Debug)]
pub enum UsersAction {
    /// List users
    List {
        /// Only show one role (player, coach, store, delivery)
        #[arg(short, long)]
        role: Option<RolePartition>,
        /// Only show one status
        #[arg(short, long, value_parser = parse_strict::<UserStatus>)]
        status: Option<UserStatus>,
        /// Match name, email, mobile or id
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one user with profile and documents
    Show {
        /// User id
        id: String,
    },
    /// Set a user's status (active, inactive, suspended, rejected, pending)
    SetStatus {
        /// User id
        id: String,
        /// New status
        #[arg(value_parser = parse_strict::<UserStatus>)]
        status: UserStatus,
    },
}

/// Arguments for the shop command
#[derive(Args, Debug)]
pub struct ShopArgs {
    #[command(subcommand)]
    pub action: ShopAction,
}

/// Shop actions
#[derive(Subcommand, Debug)]
pub enum ShopAction {
    /// Platform-wide shop metrics
    Analytics,
    /// Look up a store's shop
    Store {
        /// Store id
        id: String,
    },
}

/// Arguments for the tickets command
#[derive(Args, Debug)]
pub struct TicketsArgs {
    #[command(subcommand)]
    pub action: TicketsAction,
}

/// Support ticket actions
#[derive(Subcommand, Debug)]
pub enum TicketsAction {
    /// List tickets
    List {
        /// Only show one status (open, in_progress, resolved, closed)
        #[arg(short, long, value_parser = parse_strict::<TicketStatus>)]
        status: Option<TicketStatus>,
    },
    /// Show a ticket with its replies
    Show {
        /// Ticket id
        id: String,
    },
    /// Change a ticket's status or priority
    Update {
        /// Ticket id
        id: String,
        /// New status
        #[arg(short, long, value_parser = parse_strict::<TicketStatus>)]
        status: TicketStatus,
        /// New priority (low, medium, high, urgent)
        #[arg(short, long, value_parser = parse_strict::<TicketPriority>)]
        priority: Option<TicketPriority>,
    },
    /// Reply to a ticket
    Reply {
        /// Ticket id
        id: String,
        /// Reply text
        #[arg(short, long)]
        message: String,
    },
}

/// Parses through `FromStr`, so unrecognised values are rejected instead of
/// falling back to an unknown variant.
fn parse_strict<T>(value: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse::<T>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_approve() {
        let cli = Cli::parse_from(["sports-admin", "approvals", "approve", "u1", "--yes"]);
        match cli.command {
            Commands::Approvals(ApprovalsArgs {
                action: ApprovalsAction::Approve(args),
            }) => {
                assert_eq!(args.id, "u1");
                assert!(args.yes);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_typed_filters() {
        let cli = Cli::parse_from([
            "sports-admin", "users", "list", "--role", "seller", "--status", "suspended", "--json",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Users(UsersArgs {
                action: UsersAction::List { role, status, .. },
            }) => {
                assert_eq!(role, Some(RolePartition::Store));
                assert_eq!(status, Some(UserStatus::Suspended));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = Cli::try_parse_from(["sports-admin", "users", "set-status", "u1", "approved"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_filter_values_are_rejected() {
        for argv in [
            vec!["sports-admin", "users", "list", "--status", "bogus"],
            vec!["sports-admin", "tickets", "list", "--status", "archived"],
            vec!["sports-admin", "tickets", "update", "t1", "--status", "archived"],
            vec!["sports-admin", "tickets", "update", "t1", "--status", "open", "--priority", "asap"],
        ] {
            assert!(Cli::try_parse_from(argv.clone()).is_err(), "accepted {:?}", argv);
        }
    }

    #[test]
    fn test_parse_ticket_update() {
        let cli = Cli::parse_from([
            "sports-admin", "tickets", "update", "t1", "--status", "in_progress", "--priority", "urgent",
        ]);
        match cli.command {
            Commands::Tickets(TicketsArgs {
                action: TicketsAction::Update { id, status, priority },
            }) => {
                assert_eq!(id, "t1");
                assert_eq!(status, TicketStatus::InProgress);
                assert_eq!(priority, Some(TicketPriority::Urgent));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_zero_watch_interval_is_rejected() {
        let result = Cli::try_parse_from(["sports-admin", "approvals", "watch", "--interval", "0"]);
        assert!(result.is_err());

        let cli = Cli::parse_from(["sports-admin", "approvals", "watch", "--interval", "5"]);
        match cli.command {
            Commands::Approvals(ApprovalsArgs {
                action: ApprovalsAction::Watch { interval, .. },
            }) => assert_eq!(interval, Some(5)),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
