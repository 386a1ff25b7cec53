//! Payment entity - A member's obligation towards one draw.
//!
//! The pair (`member_id`, `draw_id`) is covered by a unique index created
//! alongside the tables, see `config::database::create_tables`.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Settlement state of a payment
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Not paid yet
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Paid; the payment carries a date
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl PaymentStatus {
    /// Lower-case label used in reports and on the command line
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the member who owes this payment
    pub member_id: i64,
    /// Member's name at the time the obligation was created
    pub member_name: String,
    /// ID of the draw this payment belongs to
    pub draw_id: i64,
    /// Amount owed
    pub amount: f64,
    /// When the payment was completed, `None` while pending
    pub date: Option<DateTimeUtc>,
    /// Current settlement state
    pub status: PaymentStatus,
    /// External transaction reference, empty until recorded
    pub transaction_id: String,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one member
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id"
    )]
    Member,
    /// Each payment belongs to one draw
    #[sea_orm(
        belongs_to = "super::draw::Entity",
        from = "Column::DrawId",
        to = "super::draw::Column::Id"
    )]
    Draw,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl Related<super::draw::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Draw.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
