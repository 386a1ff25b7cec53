//! Command-line layer - argument parsing and command handlers
//!
//! This module provides the administrator interface for the club: member
//! management, the monthly draw, payment tracking and reports. Handlers return
//! the text to print so they can be exercised without a terminal.

/// Command implementations (member, draw, payment, report, general)
pub mod commands;

use crate::{config::club::Config, errors::Result};
use clap::{Parser, Subcommand};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;

/// Shared data available to all commands.
pub struct AppContext {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Club configuration loaded at startup
    pub config: Config,
}

impl AppContext {
    /// Creates a new `AppContext` from an open connection and loaded configuration.
    #[must_use]
    pub const fn new(database: DatabaseConnection, config: Config) -> Self {
        Self { database, config }
    }
}

/// Monthly gold lucky-draw club administration
#[derive(Debug, Parser)]
#[command(name = "gold-draw-club", version)]
pub struct Cli {
    /// Path to the club configuration file
    #[arg(long, env = "CLUB_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage club members
    #[command(subcommand)]
    Member(MemberCommand),
    /// List members who can win the next draw
    Eligible,
    /// Show or set the gold price
    #[command(subcommand)]
    GoldPrice(GoldPriceCommand),
    /// Conduct this month's draw
    Draw,
    /// List past draws
    Draws {
        /// Only show the draw for this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
    },
    /// Track payments for a draw
    #[command(subcommand)]
    Payment(PaymentCommand),
    /// Club statistics, optionally for one year
    Report {
        /// Year to break down by month
        #[arg(long)]
        year: Option<i32>,
    },
    /// Show whether a draw is due and the next nominal draw date
    Status,
    /// Delete every draw and payment so all members become eligible again
    Reset {
        /// Required, the reset cannot be undone
        #[arg(long)]
        confirm: bool,
    },
}

/// Member management subcommands
#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    /// List members
    List,
    /// Register a new member
    Add {
        /// Full name
        name: String,
        /// Contact phone number
        phone: String,
        /// Contact email
        #[arg(long)]
        email: Option<String>,
    },
    /// Change a member's details
    Update {
        /// Member id
        id: i64,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New phone number
        #[arg(long)]
        phone: Option<String>,
        /// New email, an empty value clears it
        #[arg(long)]
        email: Option<String>,
    },
    /// Include a member in future draws
    Activate {
        /// Member id
        id: i64,
    },
    /// Pause a member without removing them
    Deactivate {
        /// Member id
        id: i64,
    },
    /// Remove a member, keeping their history
    Remove {
        /// Member id
        id: i64,
    },
}

/// Gold price subcommands
#[derive(Debug, Subcommand)]
pub enum GoldPriceCommand {
    /// Show the current price
    Show,
    /// Set the current price
    Set {
        /// Price per gram, or per 10 grams with --per-ten-grams
        price: f64,
        /// Interpret the price as a 10-gram rate
        #[arg(long)]
        per_ten_grams: bool,
        /// Currency code, defaults to the club currency
        #[arg(long)]
        currency: Option<String>,
    },
}

/// Payment subcommands. Draws are addressed by month (YYYY-MM).
#[derive(Debug, Subcommand)]
#[allow(missing_docs)]
pub enum PaymentCommand {
    /// Show who has paid for a draw
    Sheet { month: String },
    /// Mark a member's payment as completed
    Complete { month: String, member_id: i64 },
    /// Mark a member's payment as pending
    Pending { month: String, member_id: i64 },
    /// Record the transaction reference of a payment
    Reference {
        payment_id: i64,
        transaction_id: String,
    },
    /// Create payments still missing after a draw
    Resume { month: String },
}

/// Runs one command and returns the text to print.
pub async fn dispatch(ctx: &AppContext, command: Command) -> Result<String> {
    match command {
        Command::Member(cmd) => commands::member::run(ctx, cmd).await,
        Command::Eligible => commands::draw::eligible(ctx).await,
        Command::GoldPrice(cmd) => commands::general::gold_price(ctx, cmd).await,
        Command::Draw => commands::draw::conduct(ctx, &mut rand::thread_rng()).await,
        Command::Draws { month } => commands::draw::list(ctx, month.as_deref()).await,
        Command::Payment(cmd) => commands::payment::run(ctx, cmd).await,
        Command::Report { year } => commands::report::report(ctx, year).await,
        Command::Status => commands::general::status(ctx, chrono::Utc::now()).await,
        Command::Reset { confirm } => commands::general::reset(ctx, confirm).await,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_payment_complete() {
        let cli = Cli::try_parse_from([
            "gold-draw-club",
            "payment",
            "complete",
            "2024-03",
            "7",
        ])
        .unwrap();

        match cli.command {
            Command::Payment(PaymentCommand::Complete { month, member_id }) => {
                assert_eq!(month, "2024-03");
                assert_eq!(member_id, 7);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_gold_price_per_ten_grams() {
        let cli = Cli::try_parse_from([
            "gold-draw-club",
            "--config",
            "club.toml",
            "gold-price",
            "set",
            "72000",
            "--per-ten-grams",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("club.toml"));
        assert!(matches!(
            cli.command,
            Command::GoldPrice(GoldPriceCommand::Set {
                per_ten_grams: true,
                currency: None,
                ..
            })
        ));
    }

    #[test]
    fn test_reset_defaults_to_unconfirmed() {
        let cli = Cli::try_parse_from(["gold-draw-club", "reset"]).unwrap();
        assert!(matches!(cli.command, Command::Reset { confirm: false }));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
