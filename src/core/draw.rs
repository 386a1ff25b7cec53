//! Monthly draw engine
//!
//! Picks one winner among the eligible members, prices the prize and commits
//! the draw record. At most one draw exists per calendar month: the `draws.month`
//! column is unique, so the insert itself is the compare-and-set and a second
//! draw for the same month fails with [`Error::MonthlyDrawLimit`] no matter how
//! the calls interleave. Payment obligations are created afterwards by
//! [`crate::core::payment::materialize_payments`].

use crate::{
    core::{
        eligibility,
        gold_price::{self, GoldPriceDefaults},
        member,
        payment::{self, FanOutSummary},
        qr::{QrEncoder, QrRequest},
    },
    entities::{Draw, MemberModel, draw},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::{Rng, seq::SliceRandom};
use sea_orm::{QueryOrder, Set, SqlErr, prelude::*};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Grams of gold awarded by every draw
pub const PRIZE_GRAMS: f64 = 20.0;

/// Everything a draw needs besides storage and randomness.
pub struct DrawOptions<'a> {
    /// Produces the payment QR code URL
    pub encoder: &'a dyn QrEncoder,
    /// Text embedded in the payment QR payload
    pub payment_description: &'a str,
    /// Commit instant; also decides the draw's month
    pub now: DateTime<Utc>,
}

/// A committed draw together with the outcome of its payment fan-out.
#[derive(Debug, Clone)]
pub struct DrawOutcome {
    /// The committed draw
    pub draw: draw::Model,
    /// Payments created for the draw
    pub fan_out: FanOutSummary,
}

/// Formats a date as the `YYYY-MM` key draws are stored under.
#[must_use]
pub fn month_key<D: Datelike>(date: &D) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Validates a `YYYY-MM` month key and returns its year and month.
pub fn parse_month_key(month: &str) -> Result<(i32, u32)> {
    let invalid = || Error::InvalidInput {
        message: format!("Invalid month '{month}', expected YYYY-MM"),
    };

    if month.len() != 7 {
        return Err(invalid());
    }
    let first_day =
        NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").map_err(|_| invalid())?;
    Ok((first_day.year(), first_day.month()))
}

/// Nominal date of the next draw: `draw_day` of this month if it has not
/// passed yet, otherwise `draw_day` of next month. Informational only, draws
/// are always triggered by hand.
#[must_use]
pub fn next_draw_date(today: NaiveDate, draw_day: u32) -> Option<NaiveDate> {
    if today.day() <= draw_day {
        return today.with_day(draw_day);
    }

    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, draw_day)
}

/// Value of the prize at the given gold price.
#[must_use]
pub fn prize_total(gold_price_per_gram: f64) -> f64 {
    gold_price_per_gram * PRIZE_GRAMS
}

/// Each active member's share of `total_amount`, rounded half-up to whole
/// currency units.
pub fn amount_per_member(total_amount: f64, active_member_count: u64) -> Result<f64> {
    if active_member_count == 0 {
        return Err(Error::InvalidInput {
            message: "A draw needs at least one active member to share the prize".to_string(),
        });
    }

    // Member counts are tiny, the conversion is exact
    #[allow(clippy::cast_precision_loss)]
    let share = total_amount / active_member_count as f64;
    Ok((share + 0.5).floor())
}

/// Uniformly picks one member out of `eligible`.
pub fn select_winner<'a, R>(eligible: &'a [MemberModel], rng: &mut R) -> Option<&'a MemberModel>
where
    R: Rng + ?Sized,
{
    eligible.choose(rng)
}

/// Retrieves a draw by id.
pub async fn get_draw_by_id<C>(db: &C, draw_id: i64) -> Result<Option<draw::Model>>
where
    C: ConnectionTrait,
{
    Draw::find_by_id(draw_id).one(db).await.map_err(Into::into)
}

/// Like [`get_draw_by_id`] but an unknown id is an [`Error::InvalidReference`].
pub async fn require_draw<C>(db: &C, draw_id: i64) -> Result<draw::Model>
where
    C: ConnectionTrait,
{
    get_draw_by_id(db, draw_id)
        .await?
        .ok_or(Error::InvalidReference {
            entity: "Draw",
            id: draw_id,
        })
}

/// Retrieves the draw held in `month` (`YYYY-MM`), if any.
pub async fn draw_for_month<C>(db: &C, month: &str) -> Result<Option<draw::Model>>
where
    C: ConnectionTrait,
{
    Draw::find()
        .filter(draw::Column::Month.eq(month))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves draws newest first, optionally only the one for `month`.
pub async fn list_draws<C>(db: &C, month: Option<&str>) -> Result<Vec<draw::Model>>
where
    C: ConnectionTrait,
{
    let mut query = Draw::find();
    if let Some(month) = month {
        query = query.filter(draw::Column::Month.eq(month));
    }

    query
        .order_by_desc(draw::Column::Date)
        .order_by_desc(draw::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns true if no draw has been held yet in the month containing `now`.
pub async fn is_draw_due<C>(db: &C, now: DateTime<Utc>) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(draw_for_month(db, &month_key(&now)).await?.is_none())
}

async fn monthly_limit_error<C>(db: &C, month: &str) -> Result<Error>
where
    C: ConnectionTrait,
{
    let winner_name = draw_for_month(db, month)
        .await?
        .map_or_else(|| "unknown".to_string(), |d| d.winner_name);

    Ok(Error::MonthlyDrawLimit {
        month: month.to_string(),
        winner_name,
    })
}

/// Selects a winner among `eligible` and commits the draw for the month of
/// `options.now`.
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `rng` - Source of randomness for the selection
/// * `options` - QR encoder, payment description and commit instant
/// * `eligible` - Members who may win, see [`eligibility::eligible_members`]
/// * `gold_price_per_gram` - Current gold price
/// * `active_member_count` - Members sharing the prize, eligible or not
///
/// # Errors
/// * [`Error::NoEligibleMembers`] - `eligible` is empty
/// * [`Error::InvalidAmount`] - the gold price is not a positive number
/// * [`Error::MonthlyDrawLimit`] - the month already has a draw
#[instrument(skip(db, rng, options, eligible), fields(eligible = eligible.len()))]
pub async fn conduct_draw<C, R>(
    db: &C,
    rng: &mut R,
    options: &DrawOptions<'_>,
    eligible: &[MemberModel],
    gold_price_per_gram: f64,
    active_member_count: u64,
) -> Result<draw::Model>
where
    C: ConnectionTrait,
    R: Rng + ?Sized,
{
    if eligible.is_empty() {
        return Err(Error::NoEligibleMembers);
    }

    gold_price::validate_price(gold_price_per_gram)?;
    let total_amount = prize_total(gold_price_per_gram);
    let share = amount_per_member(total_amount, active_member_count)?;

    let winner = select_winner(eligible, rng).ok_or(Error::NoEligibleMembers)?;

    let month = month_key(&options.now);
    let reference = Uuid::new_v4().to_string();
    let qr_code_url = options.encoder.encode(&QrRequest {
        amount: share,
        reference: &reference,
        description: options.payment_description,
        timestamp: options.now,
    });
    if qr_code_url.is_none() {
        warn!("No payment QR code for the {} draw", month);
    }

    let new_draw = draw::ActiveModel {
        month: Set(month.clone()),
        date: Set(options.now),
        winner_id: Set(winner.id),
        winner_name: Set(winner.name.clone()),
        gold_price_per_gram: Set(gold_price_per_gram),
        total_amount: Set(total_amount),
        amount_per_member: Set(share),
        reference: Set(reference),
        qr_code_url: Set(qr_code_url),
        is_completed: Set(false),
        ..Default::default()
    };

    match new_draw.insert(db).await {
        Ok(committed) => {
            info!(
                "Draw {} for {}: {} wins {} ({} per member)",
                committed.id,
                committed.month,
                committed.winner_name,
                committed.total_amount,
                committed.amount_per_member
            );
            Ok(committed)
        }
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            warn!("A draw for {} already exists, rejecting", month);
            Err(monthly_limit_error(db, &month).await?)
        }
        Err(err) => Err(err.into()),
    }
}

/// Runs this month's draw end to end.
///
/// The month check, eligibility and prize pricing are fresh reads taken just
/// before the draw insert. No transaction wraps them: the unique month insert
/// in [`conduct_draw`] is the single atomic step, so a concurrent draw for the
/// same month fails with [`Error::MonthlyDrawLimit`] instead of a lock error.
/// Payments are created after the insert; a fan-out failure is reported in the
/// outcome and never undoes the draw. Missing payments can be created later
/// with [`payment::resume_fan_out`].
#[instrument(skip(db, rng, options, defaults))]
pub async fn conduct_monthly_draw<R>(
    db: &DatabaseConnection,
    rng: &mut R,
    options: &DrawOptions<'_>,
    defaults: &GoldPriceDefaults,
) -> Result<DrawOutcome>
where
    R: Rng + ?Sized,
{
    let month = month_key(&options.now);

    if draw_for_month(db, &month).await?.is_some() {
        return Err(monthly_limit_error(db, &month).await?);
    }

    let eligible = eligibility::eligible_members(db).await?;
    if eligible.is_empty() {
        warn!("Every active member has already won, no draw for {}", month);
        return Err(Error::NoEligibleMembers);
    }

    let active_members = member::list_active_members(db).await?;
    let price = gold_price::current_or_default(db, defaults).await?;

    let committed = conduct_draw(
        db,
        rng,
        options,
        &eligible,
        price.price_per_gram,
        active_members.len().try_into()?,
    )
    .await?;

    let fan_out = payment::materialize_payments(db, &committed, &active_members).await;

    Ok(DrawOutcome {
        draw: committed,
        fan_out,
    })
}

/// Formats a draw outcome into a human-readable summary.
#[must_use]
pub fn format_draw_summary(outcome: &DrawOutcome, currency: &str) -> String {
    use std::fmt::Write;

    let draw = &outcome.draw;
    let mut summary = format!("Draw for {} - Winner: {}\n", draw.month, draw.winner_name);

    // write! is infallible when writing to String
    let _ = writeln!(
        summary,
        "  Prize: {PRIZE_GRAMS} g gold at {currency} {:.2}/g = {currency} {:.2}",
        draw.gold_price_per_gram, draw.total_amount
    );
    let _ = writeln!(
        summary,
        "  Each member pays: {currency} {:.2}",
        draw.amount_per_member
    );
    let _ = writeln!(
        summary,
        "  Payments: {} created, {} already present, {} failed",
        outcome.fan_out.created, outcome.fan_out.already_present, outcome.fan_out.failed
    );
    if let Some(url) = &draw.qr_code_url {
        let _ = writeln!(summary, "  Payment QR: {url}");
    }

    summary
}
