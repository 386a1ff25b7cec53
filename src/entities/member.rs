//! Member entity - A participant of the savings club.
//!
//! Members are never hard-deleted: draws and payments keep referring to them,
//! so removal flips `is_deleted` and clears `is_active` instead.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Member database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    /// Unique identifier, stable for the member's lifetime
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Contact phone number
    pub phone: String,
    /// Optional contact email, stored lower-cased
    pub email: Option<String>,
    /// Whether the member currently takes part in draws and payments
    pub is_active: bool,
    /// Soft delete flag - if true, member is hidden but history is preserved
    pub is_deleted: bool,
    /// When the member joined the club
    pub joined_date: DateTimeUtc,
}

/// Defines relationships between Member and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One member has many payment obligations
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
