//! Statistics commands.

use crate::{
    cli::AppContext,
    core::report::{
        club_stats, format_amount, format_club_stats, monthly_activity, winner_frequency,
        yearly_stats,
    },
    errors::Result,
};
use std::fmt::Write;

/// Club statistics and winners, plus a month-by-month breakdown when a year
/// is given.
pub async fn report(ctx: &AppContext, year: Option<i32>) -> Result<String> {
    let db = &ctx.database;
    let currency = &ctx.config.club.currency;

    let stats = club_stats(db).await?;
    let mut text = format!("{}\n", ctx.config.club.name);
    text.push_str(&format_club_stats(&stats, currency));

    let winners = winner_frequency(db).await?;
    if !winners.is_empty() {
        text.push_str("Winners:\n");
        for w in &winners {
            let _ = writeln!(text, "  {:<24} {}", w.winner_name, w.wins);
        }
    }

    if let Some(year) = year {
        let yearly = yearly_stats(db, year).await?;
        let _ = writeln!(
            text,
            "{year}: {} draws, {} g gold, {} in prizes, {} payments collected ({})",
            yearly.draws,
            yearly.gold_distributed_grams,
            format_amount(yearly.total_prize_value, currency),
            yearly.completed_payments,
            format_amount(yearly.amount_collected, currency)
        );
        for month in monthly_activity(db, year).await? {
            let _ = writeln!(
                text,
                "  {}  draws {}  payments {}  collected {}",
                month.month,
                month.draws,
                month.completed_payments,
                format_amount(month.amount_collected, currency)
            );
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_report_with_year() -> Result<()> {
        let ctx = setup_test_context().await?;
        let members = create_test_members(&ctx.database, 2).await?;
        insert_test_draw(&ctx.database, "2024-03", &members[1]).await?;

        let text = report(&ctx, Some(2024)).await?;
        assert!(text.starts_with("Test Club\n"));
        assert!(text.contains("Members: 2 (2 active, 0 inactive)"));
        assert!(text.contains("Member 2"));
        assert!(text.contains("2024: 1 draws"));
        assert!(text.contains("2024-03  draws 1"));
        assert!(text.contains("2024-12  draws 0"));

        let without_year = report(&ctx, None).await?;
        assert!(!without_year.contains("2024-12"));
        Ok(())
    }
}
