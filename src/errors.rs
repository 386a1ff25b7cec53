//! Unified error type for the draw club.
//!
//! Domain failures (eligibility, monthly limit, unknown references, partial
//! fan-out) get their own variants so callers can render a useful message.
//! Storage errors are split into "the database is unreachable" and
//! everything else.

use sea_orm::DbErr;
use thiserror::Error;

/// All errors produced by the crate
#[derive(Debug, Error)]
pub enum Error {
    /// No active member is left who has not already won a draw
    #[error("No eligible members remain for the draw")]
    NoEligibleMembers,

    /// A draw already exists for the requested month
    #[error("A draw for {month} has already been conducted (winner: {winner_name})")]
    MonthlyDrawLimit {
        /// Month key in `YYYY-MM` form
        month: String,
        /// Winner of the existing draw
        winner_name: String,
    },

    /// A member, draw or payment id did not resolve to a stored record
    #[error("{entity} {id} not found")]
    InvalidReference {
        /// Kind of record that was looked up
        entity: &'static str,
        /// The identifier that failed to resolve; month lookups use `YYYYMM`
        id: i64,
    },

    /// Some payment obligations could not be created after a draw
    #[error(
        "Payment fan-out for draw {draw_id} incomplete: {created} created, {failed} failed"
    )]
    PartialFanOut {
        /// Draw whose fan-out was incomplete
        draw_id: i64,
        /// Payments created by this run
        created: usize,
        /// Members whose payment could not be created
        failed: usize,
    },

    /// The persistence layer could not be reached
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(DbErr),

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Monetary input that is zero, negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Any other rejected input
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Human-readable description
        message: String,
    },

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Integer conversion overflow
    #[error("Integer conversion error: {0}")]
    TryFromInt(#[from] std::num::TryFromIntError),
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                Self::StorageUnavailable(err.to_string())
            }
            other => Self::Database(other),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
