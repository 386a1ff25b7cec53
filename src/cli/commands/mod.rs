//! Command implementations organized by category.

/// Draw commands and eligibility listing
pub mod draw;
/// Gold price, status and reset
pub mod general;
/// Member management commands
pub mod member;
/// Payment tracking commands
pub mod payment;
/// Statistics commands
pub mod report;

use crate::{
    cli::AppContext,
    core::draw::{draw_for_month, parse_month_key},
    entities::DrawModel,
    errors::{Error, Result},
};

/// Resolves a `YYYY-MM` argument to the draw held in that month.
///
/// A well-formed month without a draw is an [`Error::InvalidReference`]
/// whose id is the month as `YYYYMM`.
pub async fn draw_in_month(ctx: &AppContext, month: &str) -> Result<DrawModel> {
    let (year, month_number) = parse_month_key(month)?;
    draw_for_month(&ctx.database, month)
        .await?
        .ok_or(Error::InvalidReference {
            entity: "Draw",
            id: i64::from(year) * 100 + i64::from(month_number),
        })
}
