//! Club administration: first-run seeding and clearing the draw history.

use crate::{
    config::club::Config,
    core::{
        gold_price::{self, GoldPriceDefaults},
        member,
    },
    entities::{Draw, Member, Payment, gold_price as gold_price_entity},
    errors::Result,
};
use sea_orm::{TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// What seeding changed.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedSummary {
    /// Members inserted from the configuration, 0 if the registry was not empty
    pub members_created: usize,
    /// The gold price in effect after seeding
    pub gold_price: gold_price_entity::Model,
}

/// What a history reset removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetSummary {
    /// Payment rows removed
    pub payments_deleted: u64,
    /// Draw rows removed
    pub draws_deleted: u64,
}

/// Prepares a fresh database from the configuration.
///
/// Configured members are only inserted when the registry holds no member at
/// all (removed members included), so running this on every start is safe. A
/// gold price row is created from the configured defaults if none exists.
#[instrument(skip(db, config))]
pub async fn seed_from_config(db: &DatabaseConnection, config: &Config) -> Result<SeedSummary> {
    let txn = db.begin().await?;

    let existing_members = Member::find().count(&txn).await?;
    let mut members_created = 0;
    if existing_members == 0 {
        for seed in &config.members {
            member::create_member(&txn, &seed.name, &seed.phone, seed.email.clone()).await?;
            members_created += 1;
        }
    }

    let defaults = GoldPriceDefaults::from_config(&config.club);
    let price = gold_price::current_or_default(&txn, &defaults).await?;

    txn.commit().await?;

    if members_created > 0 {
        info!("Seeded {} members from configuration", members_created);
    }

    Ok(SeedSummary {
        members_created,
        gold_price: price,
    })
}

/// Deletes every payment and every draw in one transaction.
///
/// This is the only way previous winners become eligible again. Members and
/// the gold price are kept.
#[instrument(skip(db))]
pub async fn reset_history(db: &DatabaseConnection) -> Result<ResetSummary> {
    let txn = db.begin().await?;

    let payments = Payment::delete_many().exec(&txn).await?;
    let draws = Draw::delete_many().exec(&txn).await?;

    txn.commit().await?;

    warn!(
        "Draw history reset: {} draws and {} payments deleted",
        draws.rows_affected, payments.rows_affected
    );

    Ok(ResetSummary {
        payments_deleted: payments.rows_affected,
        draws_deleted: draws.rows_affected,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::config::club::parse_config;
    use crate::core::{eligibility, payment::materialize_payments};
    use crate::test_utils::*;

    const CONFIG: &str = r#"
[club]
name = "Test Club"
default_gold_price_per_gram = 6500.0

[[members]]
name = "Asha"
phone = "+91 98450 00001"

[[members]]
name = "Bala"
phone = "+91 98450 00002"
email = "Bala@Example.com"
"#;

    #[tokio::test]
    async fn test_seed_from_config() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(CONFIG)?;

        let summary = seed_from_config(&db, &config).await?;
        assert_eq!(summary.members_created, 2);
        assert_eq!(summary.gold_price.price_per_gram, 6500.0);
        assert_eq!(summary.gold_price.currency, "INR");

        let members = member::list_active_members(&db).await?;
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].email.as_deref(), Some("bala@example.com"));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_skips_populated_registry() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_member(&db, "Existing").await?;
        gold_price::set_gold_price(&db, 7000.0, "INR").await?;
        let config = parse_config(CONFIG)?;

        let summary = seed_from_config(&db, &config).await?;
        assert_eq!(summary.members_created, 0);
        assert_eq!(summary.gold_price.price_per_gram, 7000.0);
        assert_eq!(member::list_members(&db).await?.len(), 1);

        // Seeding again changes nothing
        let again = seed_from_config(&db, &config).await?;
        assert_eq!(again.members_created, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_history_restores_eligibility() -> Result<()> {
        let db = setup_test_db().await?;
        let members = create_test_members(&db, 2).await?;
        let january = insert_test_draw(&db, "2024-01", &members[0]).await?;
        insert_test_draw(&db, "2024-02", &members[1]).await?;
        materialize_payments(&db, &january, &members).await;
        assert!(eligibility::eligible_members(&db).await?.is_empty());

        let summary = reset_history(&db).await?;
        assert_eq!(summary.draws_deleted, 2);
        assert_eq!(summary.payments_deleted, 2);

        assert_eq!(eligibility::eligible_members(&db).await?.len(), 2);
        assert_eq!(member::list_members(&db).await?.len(), 2);
        Ok(())
    }
}
