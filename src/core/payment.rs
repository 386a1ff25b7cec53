//! Payment obligations and their reconciliation.
//!
//! After a draw commits, every active member (the winner included) owes
//! `amount_per_member` for it. Each obligation is inserted on its own so that
//! one failure does not abort the rest; the unique `(member_id, draw_id)`
//! index turns a repeated insert into a no-op, which makes the fan-out safe
//! to run again. Status changes are single-statement upserts on the same key.

use crate::{
    core::{draw::require_draw, member},
    entities::{MemberModel, Payment, PaymentStatus, draw, payment},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::OnConflict};
use tracing::{debug, info, instrument, warn};

/// A member whose payment could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutFailure {
    /// Member left without a payment
    pub member_id: i64,
    /// Member's name, for reporting
    pub member_name: String,
    /// Storage error message
    pub reason: String,
}

/// Result of creating the payments for one draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutSummary {
    /// Draw the payments belong to
    pub draw_id: i64,
    /// Payments inserted by this run
    pub created: usize,
    /// Payments that existed before this run
    pub already_present: usize,
    /// Members whose payment could not be inserted
    pub failed: usize,
    /// Details for each failed member
    pub failures: Vec<FanOutFailure>,
}

impl FanOutSummary {
    /// Returns true when every member has a payment for the draw.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed == 0
    }

    /// Turns an incomplete fan-out into [`Error::PartialFanOut`].
    pub fn ensure_complete(&self) -> Result<()> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(Error::PartialFanOut {
                draw_id: self.draw_id,
                created: self.created,
                failed: self.failed,
            })
        }
    }
}

fn pair_conflict() -> OnConflict {
    OnConflict::columns([payment::Column::MemberId, payment::Column::DrawId]).to_owned()
}

/// Creates a pending payment of `draw.amount_per_member` for each of
/// `active_members`.
///
/// Never fails as a whole: members whose insert errors are collected in the
/// returned summary and the remaining members are still processed.
#[instrument(skip(db, draw, active_members), fields(draw_id = draw.id, members = active_members.len()))]
pub async fn materialize_payments<C>(
    db: &C,
    draw: &draw::Model,
    active_members: &[MemberModel],
) -> FanOutSummary
where
    C: ConnectionTrait,
{
    let mut summary = FanOutSummary {
        draw_id: draw.id,
        ..Default::default()
    };

    for member in active_members {
        let obligation = payment::ActiveModel {
            member_id: Set(member.id),
            member_name: Set(member.name.clone()),
            draw_id: Set(draw.id),
            amount: Set(draw.amount_per_member),
            date: Set(None),
            status: Set(PaymentStatus::Pending),
            transaction_id: Set(String::new()),
            ..Default::default()
        };

        let inserted = Payment::insert(obligation)
            .on_conflict(pair_conflict().do_nothing().to_owned())
            .exec_without_returning(db)
            .await;

        match inserted {
            Ok(0) => {
                debug!("Payment for {} already exists", member.name);
                summary.already_present += 1;
            }
            Ok(_) => summary.created += 1,
            Err(err) => {
                warn!("Could not create payment for {}: {}", member.name, err);
                summary.failed += 1;
                summary.failures.push(FanOutFailure {
                    member_id: member.id,
                    member_name: member.name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    if summary.is_complete() {
        info!(
            "Payments for draw {}: {} created, {} already present",
            draw.id, summary.created, summary.already_present
        );
    } else {
        warn!(
            "Payments for draw {} incomplete: {} created, {} failed",
            draw.id, summary.created, summary.failed
        );
    }

    summary
}

/// Creates any payments still missing for a committed draw, against the
/// members active now. The winner is not re-drawn.
#[instrument(skip(db))]
pub async fn resume_fan_out<C>(db: &C, draw_id: i64) -> Result<FanOutSummary>
where
    C: ConnectionTrait,
{
    let draw = require_draw(db, draw_id).await?;
    let active_members = member::list_active_members(db).await?;
    Ok(materialize_payments(db, &draw, &active_members).await)
}

/// Finds the payment a member owes for a draw.
pub async fn find_payment<C>(db: &C, member_id: i64, draw_id: i64) -> Result<Option<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .filter(payment::Column::MemberId.eq(member_id))
        .filter(payment::Column::DrawId.eq(draw_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every payment, newest draw first.
pub async fn list_payments<C>(db: &C) -> Result<Vec<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .order_by_desc(payment::Column::DrawId)
        .order_by_asc(payment::Column::MemberId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the payments recorded for one draw, ordered by member.
pub async fn list_payments_for_draw<C>(db: &C, draw_id: i64) -> Result<Vec<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .filter(payment::Column::DrawId.eq(draw_id))
        .order_by_asc(payment::Column::MemberId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets the status of a member's payment for a draw.
///
/// Inserts the payment if it does not exist yet, otherwise updates it, in a
/// single statement keyed on `(member_id, draw_id)`. Completing a payment
/// stamps it with the current time; moving it back to pending clears the
/// date.
///
/// # Errors
/// * [`Error::InvalidReference`] - unknown member or draw
#[instrument(skip(db))]
pub async fn set_payment_status<C>(
    db: &C,
    member_id: i64,
    draw_id: i64,
    status: PaymentStatus,
) -> Result<payment::Model>
where
    C: ConnectionTrait,
{
    let member = member::require_member(db, member_id).await?;
    let draw = require_draw(db, draw_id).await?;

    let date = match status {
        PaymentStatus::Completed => Some(Utc::now()),
        PaymentStatus::Pending => None,
    };

    let row = payment::ActiveModel {
        member_id: Set(member.id),
        member_name: Set(member.name),
        draw_id: Set(draw.id),
        amount: Set(draw.amount_per_member),
        date: Set(date),
        status: Set(status),
        transaction_id: Set(String::new()),
        ..Default::default()
    };

    Payment::insert(row)
        .on_conflict(
            pair_conflict()
                .update_columns([payment::Column::Status, payment::Column::Date])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    info!(
        "Payment of member {} for draw {} marked {}",
        member_id, draw_id, status
    );

    find_payment(db, member_id, draw_id)
        .await?
        .ok_or(Error::InvalidReference {
            entity: "Payment",
            id: member_id,
        })
}

/// Records the external transaction reference of a payment.
#[instrument(skip(db))]
pub async fn set_transaction_id<C>(
    db: &C,
    payment_id: i64,
    transaction_id: &str,
) -> Result<payment::Model>
where
    C: ConnectionTrait,
{
    let existing = Payment::find_by_id(payment_id)
        .one(db)
        .await?
        .ok_or(Error::InvalidReference {
            entity: "Payment",
            id: payment_id,
        })?;

    let mut active_model: payment::ActiveModel = existing.into();
    active_model.transaction_id = Set(transaction_id.trim().to_string());
    active_model.update(db).await.map_err(Into::into)
}
