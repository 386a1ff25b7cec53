//! Core business logic - framework-agnostic member, draw, payment and
//! reporting operations.
//!
//! Every operation takes a `SeaORM` connection (or transaction) and returns
//! [`crate::errors::Result`]; nothing in here knows about the command line.

/// Seeding from configuration and history reset
pub mod admin;
/// Monthly draw engine
pub mod draw;
/// Who may win the next draw
pub mod eligibility;
/// Current gold rate
pub mod gold_price;
/// Member registry
pub mod member;
/// Payment fan-out and status reconciliation
pub mod payment;
/// Payment QR code encoding
pub mod qr;
/// Club statistics and payment sheets
pub mod report;
