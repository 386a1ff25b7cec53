//! Payment commands - payment sheet, status changes, transaction references
//! and resuming an incomplete fan-out.

use super::draw_in_month;
use crate::{
    cli::{AppContext, PaymentCommand},
    core::{
        payment::{resume_fan_out, set_payment_status, set_transaction_id},
        report::{draw_payment_sheet, format_payment_sheet},
    },
    entities::PaymentStatus,
    errors::Result,
};

/// Runs a payment subcommand.
pub async fn run(ctx: &AppContext, command: PaymentCommand) -> Result<String> {
    let db = &ctx.database;

    match command {
        PaymentCommand::Sheet { month } => {
            let draw = draw_in_month(ctx, &month).await?;
            let sheet = draw_payment_sheet(db, draw.id).await?;
            Ok(format_payment_sheet(&sheet, &ctx.config.club.currency))
        }
        PaymentCommand::Complete { month, member_id } => {
            set_status(ctx, &month, member_id, PaymentStatus::Completed).await
        }
        PaymentCommand::Pending { month, member_id } => {
            set_status(ctx, &month, member_id, PaymentStatus::Pending).await
        }
        PaymentCommand::Reference {
            payment_id,
            transaction_id,
        } => {
            let payment = set_transaction_id(db, payment_id, &transaction_id).await?;
            Ok(format!(
                "Payment {} of {} now references {}",
                payment.id, payment.member_name, payment.transaction_id
            ))
        }
        PaymentCommand::Resume { month } => {
            let draw = draw_in_month(ctx, &month).await?;
            let summary = resume_fan_out(db, draw.id).await?;
            summary.ensure_complete()?;
            Ok(format!(
                "Payments for {}: {} created, {} already present",
                draw.month, summary.created, summary.already_present
            ))
        }
    }
}

async fn set_status(
    ctx: &AppContext,
    month: &str,
    member_id: i64,
    status: PaymentStatus,
) -> Result<String> {
    let draw = draw_in_month(ctx, month).await?;
    let payment = set_payment_status(&ctx.database, member_id, draw.id, status).await?;
    Ok(format!(
        "Payment of {} for {} is {}",
        payment.member_name, draw.month, payment.status
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_payment_commands() -> Result<()> {
        let ctx = setup_test_context().await?;
        let members = create_test_members(&ctx.database, 2).await?;
        insert_test_draw(&ctx.database, "2024-03", &members[0]).await?;

        let resumed = run(
            &ctx,
            PaymentCommand::Resume {
                month: "2024-03".to_string(),
            },
        )
        .await?;
        assert_eq!(resumed, "Payments for 2024-03: 2 created, 0 already present");

        let done = run(
            &ctx,
            PaymentCommand::Complete {
                month: "2024-03".to_string(),
                member_id: members[1].id,
            },
        )
        .await?;
        assert_eq!(done, "Payment of Member 2 for 2024-03 is completed");

        let sheet = run(
            &ctx,
            PaymentCommand::Sheet {
                month: "2024-03".to_string(),
            },
        )
        .await?;
        assert!(sheet.contains("Collected INR 4000.00 / pending INR 4000.00"));
        Ok(())
    }

    #[tokio::test]
    async fn test_payment_unknown_month() -> Result<()> {
        let ctx = setup_test_context().await?;

        let result = run(
            &ctx,
            PaymentCommand::Sheet {
                month: "2024-03".to_string(),
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidReference {
                entity: "Draw",
                id: 202_403
            }
        ));

        let result = run(
            &ctx,
            PaymentCommand::Sheet {
                month: "March".to_string(),
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));
        Ok(())
    }
}
