//! Draw entity - One monthly lucky draw.
//!
//! `month` carries a UNIQUE constraint so the storage layer itself refuses a
//! second draw for the same month. `winner_name` is a snapshot taken at draw
//! time and does not follow later member edits.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Draw database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "draws")]
pub struct Model {
    /// Unique identifier for the draw
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Month key in `YYYY-MM` form
    #[sea_orm(unique)]
    pub month: String,
    /// When the draw was committed
    pub date: DateTimeUtc,
    /// ID of the winning member
    pub winner_id: i64,
    /// Winner's name at the time of the draw
    pub winner_name: String,
    /// Gold price per gram used for this draw
    pub gold_price_per_gram: f64,
    /// Value of the prize
    pub total_amount: f64,
    /// Share owed by every active member
    pub amount_per_member: f64,
    /// Reference token embedded in the payment QR payload
    pub reference: String,
    /// Payment QR code URL, `None` if the encoder was unavailable
    pub qr_code_url: Option<String>,
    /// Reserved for settlement tracking, created as false
    pub is_completed: bool,
}

/// Defines relationships between Draw and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each draw has one winning member
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::WinnerId",
        to = "super::member::Column::Id"
    )]
    Winner,
    /// One draw has many payment obligations
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
