//! Draw commands - conduct the monthly draw, list past draws and show who can
//! still win.

use crate::{
    cli::AppContext,
    core::{
        draw::{DrawOptions, conduct_monthly_draw, format_draw_summary, list_draws},
        eligibility::eligible_members,
        gold_price::GoldPriceDefaults,
        qr::QrServerEncoder,
    },
    errors::Result,
};
use chrono::Utc;
use rand::Rng;
use std::fmt::Write;
use tracing::warn;

/// Lists the members who can win the next draw.
pub async fn eligible(ctx: &AppContext) -> Result<String> {
    let members = eligible_members(&ctx.database).await?;
    if members.is_empty() {
        return Ok(
            "Every active member has already won. Reset the draw history to start a new rotation."
                .to_string(),
        );
    }

    let mut text = format!("{} eligible members\n", members.len());
    for m in &members {
        let _ = writeln!(text, "  {:<4} {}", m.id, m.name);
    }
    Ok(text)
}

/// Conducts this month's draw and reports the winner and payment fan-out.
pub async fn conduct<R>(ctx: &AppContext, rng: &mut R) -> Result<String>
where
    R: Rng + ?Sized,
{
    let club = &ctx.config.club;
    let encoder = QrServerEncoder::from_config(&ctx.config.qr);
    let description = format!("{} - Monthly Draw Payment", club.name);
    let options = DrawOptions {
        encoder: &encoder,
        payment_description: &description,
        now: Utc::now(),
    };

    let outcome = conduct_monthly_draw(
        &ctx.database,
        rng,
        &options,
        &GoldPriceDefaults::from_config(club),
    )
    .await?;

    let mut text = format_draw_summary(&outcome, &club.currency);
    if let Err(e) = outcome.fan_out.ensure_complete() {
        warn!("{}", e);
        for failure in &outcome.fan_out.failures {
            let _ = writeln!(
                text,
                "  ! {} ({}): {}",
                failure.member_name, failure.member_id, failure.reason
            );
        }
        let _ = writeln!(
            text,
            "Run `payment resume {}` to create the missing payments.",
            outcome.draw.month
        );
    }
    Ok(text)
}

/// Lists draws newest first.
pub async fn list(ctx: &AppContext, month: Option<&str>) -> Result<String> {
    let draws = list_draws(&ctx.database, month).await?;
    if draws.is_empty() {
        return Ok("No draws found.".to_string());
    }

    let currency = &ctx.config.club.currency;
    let mut text = String::new();
    for d in &draws {
        let _ = writeln!(
            text,
            "{}  {:<24} {currency} {:.2} ({currency} {:.2} per member)  ref {}",
            d.month, d.winner_name, d.total_amount, d.amount_per_member, d.reference
        );
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_eligible_listing() -> Result<()> {
        let ctx = setup_test_context().await?;
        let members = create_test_members(&ctx.database, 2).await?;
        insert_test_draw(&ctx.database, "2024-01", &members[0]).await?;

        let text = eligible(&ctx).await?;
        assert!(text.starts_with("1 eligible members"));
        assert!(text.contains("Member 2"));

        insert_test_draw(&ctx.database, "2024-02", &members[1]).await?;
        let text = eligible(&ctx).await?;
        assert!(text.starts_with("Every active member has already won"));
        Ok(())
    }

    #[tokio::test]
    async fn test_conduct_and_list() -> Result<()> {
        let ctx = setup_test_context().await?;
        create_test_members(&ctx.database, 3).await?;

        let text = conduct(&ctx, &mut seeded_rng()).await?;
        assert!(text.contains("Winner: Member"));
        assert!(text.contains("3 created"));
        assert!(text.contains("Payment QR: https://api.qrserver.com/"));

        let listing = list(&ctx, None).await?;
        assert_eq!(listing.lines().count(), 1);
        assert!(listing.contains("INR 120000.00"));
        assert!(listing.contains("INR 40000.00 per member"));

        assert_eq!(list(&ctx, Some("1999-01")).await?, "No draws found.");
        Ok(())
    }
}
