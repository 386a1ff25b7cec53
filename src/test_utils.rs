//! Shared test utilities for the draw club.
//!
//! This module provides common helper functions for setting up test databases
//! and creating members and draws with sensible defaults.

use crate::{
    cli::AppContext,
    config::club::{Config, parse_config},
    core::{
        draw::{DrawOptions, parse_month_key},
        member,
        qr::NoQrEncoder,
    },
    entities::{self, draw},
    errors::{Error, Result},
};
use chrono::{DateTime, TimeZone, Utc};
use rand::{SeedableRng, rngs::StdRng};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

const TEST_CONFIG: &str = r#"
[club]
name = "Test Club"
currency = "INR"
default_gold_price_per_gram = 6000.0
draw_day = 15
"#;

/// Club configuration used by command tests.
pub fn test_config() -> Result<Config> {
    parse_config(TEST_CONFIG)
}

/// Command context over a fresh in-memory database and [`test_config`].
pub async fn setup_test_context() -> Result<AppContext> {
    Ok(AppContext::new(setup_test_db().await?, test_config()?))
}

/// Deterministic RNG so draw tests are repeatable.
#[must_use]
pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// 15 March 2024, 10:00 UTC
#[must_use]
pub fn march_2024() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Draw options that skip QR generation.
#[must_use]
pub fn test_draw_options(now: DateTime<Utc>) -> DrawOptions<'static> {
    DrawOptions {
        encoder: &NoQrEncoder,
        payment_description: "Test Club - Monthly Draw Payment",
        now,
    }
}

/// Creates an active test member.
///
/// # Defaults
/// * `phone`: "+91 90000 00000"
/// * `email`: None
pub async fn create_test_member(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::member::Model> {
    member::create_member(db, name, "+91 90000 00000", None).await
}

/// Creates `count` active members named "Member 1", "Member 2", ... in id order.
pub async fn create_test_members(
    db: &DatabaseConnection,
    count: usize,
) -> Result<Vec<entities::member::Model>> {
    let mut members = Vec::with_capacity(count);
    for i in 1..=count {
        members.push(create_test_member(db, &format!("Member {i}")).await?);
    }
    Ok(members)
}

fn draw_date(month: &str) -> Result<DateTime<Utc>> {
    let (year, month_number) = parse_month_key(month)?;
    Utc.with_ymd_and_hms(year, month_number, 15, 10, 0, 0)
        .single()
        .ok_or_else(|| Error::InvalidInput {
            message: format!("No draw date in {month}"),
        })
}

/// Stores a draw won by `winner` without going through the draw engine.
///
/// # Defaults
/// * gold price 6000 per gram, prize 120000, 4000 per member
/// * `date`: the 15th of `month` at 10:00 UTC
pub async fn insert_test_draw(
    db: &DatabaseConnection,
    month: &str,
    winner: &entities::member::Model,
) -> Result<draw::Model> {
    let new_draw = draw::ActiveModel {
        month: Set(month.to_string()),
        date: Set(draw_date(month)?),
        winner_id: Set(winner.id),
        winner_name: Set(winner.name.clone()),
        gold_price_per_gram: Set(6000.0),
        total_amount: Set(120_000.0),
        amount_per_member: Set(4000.0),
        reference: Set(format!("test-{month}")),
        qr_code_url: Set(None),
        is_completed: Set(false),
        ..Default::default()
    };
    new_draw.insert(db).await.map_err(Into::into)
}

/// In-memory member for pure tests.
#[must_use]
pub fn member_fixture(id: i64, name: &str, is_active: bool) -> entities::member::Model {
    entities::member::Model {
        id,
        name: name.to_string(),
        phone: "+91 90000 00000".to_string(),
        email: None,
        is_active,
        is_deleted: false,
        joined_date: march_2024(),
    }
}

/// In-memory draw for pure tests, priced like [`insert_test_draw`].
#[must_use]
pub fn draw_fixture(id: i64, month: &str, winner_id: i64) -> draw::Model {
    draw::Model {
        id,
        month: month.to_string(),
        date: draw_date(month).unwrap_or_default(),
        winner_id,
        winner_name: format!("Member {winner_id}"),
        gold_price_per_gram: 6000.0,
        total_amount: 120_000.0,
        amount_per_member: 4000.0,
        reference: format!("test-{month}"),
        qr_code_url: None,
        is_completed: false,
    }
}
