//! Gold price business logic.
//!
//! The club keeps exactly one current gold rate. It lives in a single row
//! under [`gold_price::CURRENT_PRICE_ID`]; setting a new price overwrites that
//! row and bumps its version instead of appending a new record.

use crate::{
    config::club::ClubConfig,
    entities::{GoldPrice, gold_price},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::OnConflict};
use tracing::{info, instrument};

/// Price and currency used when no price has been set yet.
#[derive(Debug, Clone, PartialEq)]
pub struct GoldPriceDefaults {
    /// Default price of one gram of gold
    pub price_per_gram: f64,
    /// Default currency code
    pub currency: String,
}

impl GoldPriceDefaults {
    /// Takes the defaults from the club configuration
    #[must_use]
    pub fn from_config(club: &ClubConfig) -> Self {
        Self {
            price_per_gram: club.default_gold_price_per_gram,
            currency: club.currency.clone(),
        }
    }
}

impl Default for GoldPriceDefaults {
    fn default() -> Self {
        Self {
            price_per_gram: 6000.0,
            currency: "INR".to_string(),
        }
    }
}

/// Rejects prices that are zero, negative or not finite.
pub fn validate_price(price_per_gram: f64) -> Result<()> {
    if !price_per_gram.is_finite() || price_per_gram <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: price_per_gram,
        });
    }
    Ok(())
}

/// Converts a quoted 10-gram rate to a per-gram price.
#[must_use]
pub fn price_per_gram_from_ten_grams(ten_gram_rate: f64) -> f64 {
    ten_gram_rate / 10.0
}

/// Returns the current gold price, or `None` if it was never set.
pub async fn current_gold_price<C>(db: &C) -> Result<Option<gold_price::Model>>
where
    C: ConnectionTrait,
{
    GoldPrice::find_by_id(gold_price::CURRENT_PRICE_ID)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the current gold price, storing `defaults` first if none exists.
///
/// The insert is a no-op when another caller created the row in the meantime.
pub async fn current_or_default<C>(
    db: &C,
    defaults: &GoldPriceDefaults,
) -> Result<gold_price::Model>
where
    C: ConnectionTrait,
{
    if let Some(price) = current_gold_price(db).await? {
        return Ok(price);
    }

    validate_price(defaults.price_per_gram)?;
    let row = gold_price::ActiveModel {
        id: Set(gold_price::CURRENT_PRICE_ID),
        price_per_gram: Set(defaults.price_per_gram),
        currency: Set(defaults.currency.clone()),
        version: Set(1),
        last_updated: Set(Utc::now()),
    };
    GoldPrice::insert(row)
        .on_conflict(
            OnConflict::column(gold_price::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    info!(
        "Initialised gold price to {} {} per gram",
        defaults.price_per_gram, defaults.currency
    );

    current_gold_price(db).await?.ok_or(Error::InvalidReference {
        entity: "Gold price",
        id: i64::from(gold_price::CURRENT_PRICE_ID),
    })
}

/// Sets the current gold price.
///
/// # Arguments
/// * `db` - Database connection
/// * `price_per_gram` - New price for one gram, must be positive and finite
/// * `currency` - Currency code the price is quoted in
///
/// # Returns
/// The stored price with its version incremented
#[instrument(skip(db))]
pub async fn set_gold_price(
    db: &DatabaseConnection,
    price_per_gram: f64,
    currency: &str,
) -> Result<gold_price::Model> {
    validate_price(price_per_gram)?;
    let now = Utc::now();

    let txn = db.begin().await?;

    let existing = GoldPrice::find_by_id(gold_price::CURRENT_PRICE_ID)
        .one(&txn)
        .await?;

    let stored = if let Some(current) = existing {
        let next_version = current.version + 1;
        let mut active_model: gold_price::ActiveModel = current.into();
        active_model.price_per_gram = Set(price_per_gram);
        active_model.currency = Set(currency.to_string());
        active_model.version = Set(next_version);
        active_model.last_updated = Set(now);
        active_model.update(&txn).await?
    } else {
        let new_price = gold_price::ActiveModel {
            id: Set(gold_price::CURRENT_PRICE_ID),
            price_per_gram: Set(price_per_gram),
            currency: Set(currency.to_string()),
            version: Set(1),
            last_updated: Set(now),
        };
        new_price.insert(&txn).await?
    };

    txn.commit().await?;

    info!(
        "Gold price set to {} {} per gram (version {})",
        stored.price_per_gram, stored.currency, stored.version
    );
    Ok(stored)
}
