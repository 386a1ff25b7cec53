//! Database configuration module for the draw club.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The one constraint the entity
//! macros cannot express, uniqueness of a payment per (member, draw) pair, is added
//! here as an explicit index.

use crate::entities::{Draw, GoldPrice, Member, Payment, payment};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://gold_draw_club.sqlite?mode=rwc";

/// Name of the unique index over `payments(member_id, draw_id)`
pub const PAYMENT_PAIR_INDEX: &str = "idx_payments_member_draw";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file (created on first use) if no
/// environment variable is set.
#[instrument]
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables and the payment pair index if they do not exist yet.
///
/// Tables are created parents first because `SQLite` enforces the foreign keys
/// generated from the entity relations.
#[instrument(skip(db))]
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(Member),
        schema.create_table_from_entity(GoldPrice),
        schema.create_table_from_entity(Draw),
        schema.create_table_from_entity(Payment),
    ];

    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    let payment_pair_index = Index::create()
        .name(PAYMENT_PAIR_INDEX)
        .table(Payment)
        .col(payment::Column::MemberId)
        .col(payment::Column::DrawId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&payment_pair_index)).await?;

    info!("Database schema is up to date");
    Ok(())
}
