//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod draw;
pub mod gold_price;
pub mod member;
pub mod payment;

// Re-export specific types to avoid conflicts
pub use draw::{Column as DrawColumn, Entity as Draw, Model as DrawModel};
pub use gold_price::{
    Column as GoldPriceColumn, Entity as GoldPrice, Model as GoldPriceModel,
};
pub use member::{Column as MemberColumn, Entity as Member, Model as MemberModel};
pub use payment::{
    Column as PaymentColumn, Entity as Payment, Model as PaymentModel, PaymentStatus,
};
