//! General commands - gold price, draw status and history reset.

use crate::{
    cli::{AppContext, GoldPriceCommand},
    core::{
        admin::reset_history,
        draw::{is_draw_due, month_key, next_draw_date},
        eligibility::eligible_members,
        gold_price::{current_gold_price, price_per_gram_from_ten_grams, set_gold_price},
        report::format_amount,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};

/// Shows or sets the gold price.
pub async fn gold_price(ctx: &AppContext, command: GoldPriceCommand) -> Result<String> {
    match command {
        GoldPriceCommand::Show => {
            let Some(price) = current_gold_price(&ctx.database).await? else {
                return Ok("No gold price has been set yet.".to_string());
            };
            Ok(format!(
                "Gold price: {}/g (version {}, updated {})",
                format_amount(price.price_per_gram, &price.currency),
                price.version,
                price.last_updated.format("%Y-%m-%d %H:%M UTC")
            ))
        }
        GoldPriceCommand::Set {
            price,
            per_ten_grams,
            currency,
        } => {
            let price_per_gram = if per_ten_grams {
                price_per_gram_from_ten_grams(price)
            } else {
                price
            };
            let currency = currency.unwrap_or_else(|| ctx.config.club.currency.clone());
            let stored = set_gold_price(&ctx.database, price_per_gram, &currency).await?;
            Ok(format!(
                "Gold price set to {}/g (version {})",
                format_amount(stored.price_per_gram, &stored.currency),
                stored.version
            ))
        }
    }
}

/// Reports whether this month's draw is still due and when the next one is.
pub async fn status(ctx: &AppContext, now: DateTime<Utc>) -> Result<String> {
    let due = is_draw_due(&ctx.database, now).await?;
    let eligible = eligible_members(&ctx.database).await?.len();

    let draw_line = if due {
        format!("The draw for {} has not been held yet.", month_key(&now))
    } else {
        format!("The draw for {} has been held.", month_key(&now))
    };
    let next = next_draw_date(now.date_naive(), ctx.config.club.draw_day)
        .map_or_else(|| "unknown".to_string(), |d| d.format("%Y-%m-%d").to_string());

    Ok(format!(
        "{draw_line}\nNext nominal draw date: {next}\nEligible members: {eligible}"
    ))
}

/// Clears the draw history. Refuses to run without confirmation.
pub async fn reset(ctx: &AppContext, confirm: bool) -> Result<String> {
    if !confirm {
        return Err(Error::InvalidInput {
            message: "Resetting deletes every draw and payment; pass --confirm to proceed"
                .to_string(),
        });
    }

    let summary = reset_history(&ctx.database).await?;
    Ok(format!(
        "Deleted {} draws and {} payments. All active members are eligible again.",
        summary.draws_deleted, summary.payments_deleted
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_gold_price_commands() -> Result<()> {
        let ctx = setup_test_context().await?;

        let shown = gold_price(&ctx, GoldPriceCommand::Show).await?;
        assert_eq!(shown, "No gold price has been set yet.");

        let set = gold_price(
            &ctx,
            GoldPriceCommand::Set {
                price: 72_000.0,
                per_ten_grams: true,
                currency: None,
            },
        )
        .await?;
        assert_eq!(set, "Gold price set to INR 7200.00/g (version 1)");

        let shown = gold_price(&ctx, GoldPriceCommand::Show).await?;
        assert!(shown.starts_with("Gold price: INR 7200.00/g (version 1"));

        let result = gold_price(
            &ctx,
            GoldPriceCommand::Set {
                price: -1.0,
                per_ten_grams: false,
                currency: None,
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_status() -> Result<()> {
        let ctx = setup_test_context().await?;
        let members = create_test_members(&ctx.database, 2).await?;

        let text = status(&ctx, march_2024()).await?;
        assert!(text.contains("The draw for 2024-03 has not been held yet."));
        assert!(text.contains("Next nominal draw date: 2024-03-15"));
        assert!(text.contains("Eligible members: 2"));

        insert_test_draw(&ctx.database, "2024-03", &members[0]).await?;
        let text = status(&ctx, march_2024()).await?;
        assert!(text.contains("has been held."));
        assert!(text.contains("Eligible members: 1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_requires_confirmation() -> Result<()> {
        let ctx = setup_test_context().await?;
        let members = create_test_members(&ctx.database, 1).await?;
        insert_test_draw(&ctx.database, "2024-03", &members[0]).await?;

        let result = reset(&ctx, false).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));
        assert!(!is_draw_due(&ctx.database, march_2024()).await?);

        let text = reset(&ctx, true).await?;
        assert!(text.starts_with("Deleted 1 draws and 0 payments."));
        assert!(is_draw_due(&ctx.database, march_2024()).await?);
        Ok(())
    }
}
