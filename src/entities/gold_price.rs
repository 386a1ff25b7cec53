//! Gold price entity - The club's current gold rate.
//!
//! A single row under a fixed id; each update bumps `version`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Primary key of the one and only gold price row
pub const CURRENT_PRICE_ID: i32 = 1;

/// Gold price database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gold_price")]
pub struct Model {
    /// Always [`CURRENT_PRICE_ID`]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    /// Price of one gram of gold
    pub price_per_gram: f64,
    /// Currency code, e.g. `"INR"`
    pub currency: String,
    /// Incremented on every update, starting at 1
    pub version: i64,
    /// When the price was last set
    pub last_updated: DateTimeUtc,
}

/// `GoldPrice` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
