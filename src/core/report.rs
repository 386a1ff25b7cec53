//! Report generation business logic.
//!
//! This module provides club statistics, yearly and monthly activity, winner
//! history and the per-draw payment sheet. All functions return structured
//! data; the formatting helpers at the bottom turn it into text for the
//! command line.

use crate::{
    core::{
        draw::{PRIZE_GRAMS, list_draws, require_draw},
        member::{list_active_members, list_members},
        payment::list_payments_for_draw,
    },
    entities::{Draw, MemberModel, Payment, PaymentStatus, draw, payment},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;

/// Club-wide totals.
#[derive(Debug, Clone, PartialEq)]
pub struct ClubStats {
    /// Members that have not been removed
    pub total_members: usize,
    /// Members currently taking part in draws
    pub active_members: usize,
    /// Members paused but not removed
    pub inactive_members: usize,
    /// Draws held so far
    pub total_draws: usize,
    /// Grams of gold awarded across all draws
    pub gold_distributed_grams: f64,
    /// Value of all prizes at their draw-time price
    pub total_prize_value: f64,
    /// Mean gold price per gram over all draws, 0 without draws
    pub average_gold_price: f64,
}

/// Totals for the draws held in one calendar year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyStats {
    /// Calendar year
    pub year: i32,
    /// Draws held in the year
    pub draws: usize,
    /// Grams of gold awarded in the year
    pub gold_distributed_grams: f64,
    /// Value of the year's prizes at their draw-time price
    pub total_prize_value: f64,
    /// Payments marked completed for those draws
    pub completed_payments: usize,
    /// Sum of the completed payments
    pub amount_collected: f64,
}

/// Activity of one month within a year.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthActivity {
    /// Month key in `YYYY-MM` form
    pub month: String,
    /// Draws held in the month, 0 or 1
    pub draws: usize,
    /// Payments marked completed for the month's draw
    pub completed_payments: usize,
    /// Sum of those completed payments
    pub amount_collected: f64,
}

/// How often a member has won.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinnerFrequency {
    /// Winning member
    pub member_id: i64,
    /// Name recorded on the most recent win
    pub winner_name: String,
    /// Number of draws won
    pub wins: usize,
}

/// One line of a draw's payment sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSheetRow {
    /// Paying member
    pub member_id: i64,
    /// Name stored on the payment, or the registry name for unstored rows
    pub member_name: String,
    /// Amount owed for the draw
    pub amount: f64,
    /// Completed or pending
    pub status: PaymentStatus,
    /// Completion time, `None` while pending
    pub date: Option<DateTime<Utc>>,
    /// Payer's transaction reference, empty until recorded
    pub transaction_id: String,
    /// False for a pending row shown for an active member who has no stored
    /// payment yet
    pub is_recorded: bool,
}

/// Who has paid for a draw and who still owes.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSheet {
    /// The draw being settled
    pub draw: draw::Model,
    /// Rows ordered by member id
    pub rows: Vec<PaymentSheetRow>,
    /// Sum of completed payments
    pub collected: f64,
    /// Sum still owed
    pub pending: f64,
    /// Share of the total already collected (0-100)
    pub progress_percent: f64,
    /// True when the sheet has rows and every row is completed
    pub all_completed: bool,
}

fn collected_by_draw(payments: &[payment::Model]) -> HashMap<i64, (usize, f64)> {
    let mut totals: HashMap<i64, (usize, f64)> = HashMap::new();
    for p in payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Completed)
    {
        let entry = totals.entry(p.draw_id).or_default();
        entry.0 += 1;
        entry.1 += p.amount;
    }
    totals
}

async fn draws_in_year<C>(db: &C, year: i32) -> Result<(Vec<draw::Model>, Vec<payment::Model>)>
where
    C: ConnectionTrait,
{
    let draws = Draw::find()
        .filter(draw::Column::Month.starts_with(format!("{year:04}-")))
        .all(db)
        .await?;

    let draw_ids: Vec<i64> = draws.iter().map(|d| d.id).collect();
    let payments = if draw_ids.is_empty() {
        Vec::new()
    } else {
        Payment::find()
            .filter(payment::Column::DrawId.is_in(draw_ids))
            .all(db)
            .await?
    };

    Ok((draws, payments))
}

/// Computes club-wide totals.
pub async fn club_stats<C>(db: &C) -> Result<ClubStats>
where
    C: ConnectionTrait,
{
    let members = list_members(db).await?;
    let draws = Draw::find().all(db).await?;

    let active_members = members.iter().filter(|m| m.is_active).count();
    let total_prize_value: f64 = draws.iter().map(|d| d.total_amount).sum();
    let price_sum: f64 = draws.iter().map(|d| d.gold_price_per_gram).sum();

    // Draw counts are small, the conversion is exact
    #[allow(clippy::cast_precision_loss)]
    let draw_count = draws.len() as f64;
    let average_gold_price = if draws.is_empty() {
        0.0
    } else {
        price_sum / draw_count
    };

    Ok(ClubStats {
        total_members: members.len(),
        active_members,
        inactive_members: members.len() - active_members,
        total_draws: draws.len(),
        gold_distributed_grams: draw_count * PRIZE_GRAMS,
        total_prize_value,
        average_gold_price,
    })
}

/// Computes totals for the draws held in `year`.
pub async fn yearly_stats<C>(db: &C, year: i32) -> Result<YearlyStats>
where
    C: ConnectionTrait,
{
    let (draws, payments) = draws_in_year(db, year).await?;
    let collected = collected_by_draw(&payments);

    #[allow(clippy::cast_precision_loss)]
    let gold_distributed_grams = draws.len() as f64 * PRIZE_GRAMS;

    Ok(YearlyStats {
        year,
        draws: draws.len(),
        gold_distributed_grams,
        total_prize_value: draws.iter().map(|d| d.total_amount).sum(),
        completed_payments: collected.values().map(|(count, _)| count).sum(),
        amount_collected: collected.values().map(|(_, amount)| amount).sum(),
    })
}

/// Breaks `year` down into twelve months, January first. Months without a
/// draw are present with zero activity.
pub async fn monthly_activity<C>(db: &C, year: i32) -> Result<Vec<MonthActivity>>
where
    C: ConnectionTrait,
{
    let (draws, payments) = draws_in_year(db, year).await?;
    let collected = collected_by_draw(&payments);

    let activity = (1..=12)
        .map(|month| {
            let key = format!("{year:04}-{month:02}");
            let month_draws: Vec<&draw::Model> = draws.iter().filter(|d| d.month == key).collect();
            let (completed_payments, amount_collected) = month_draws
                .iter()
                .filter_map(|d| collected.get(&d.id))
                .fold((0, 0.0), |(count, amount), (c, a)| (count + c, amount + a));

            MonthActivity {
                month: key,
                draws: month_draws.len(),
                completed_payments,
                amount_collected,
            }
        })
        .collect();

    Ok(activity)
}

/// Every draw held, newest first.
pub async fn winner_history<C>(db: &C) -> Result<Vec<draw::Model>>
where
    C: ConnectionTrait,
{
    list_draws(db, None).await
}

/// Win counts per member, most frequent first then by name.
pub async fn winner_frequency<C>(db: &C) -> Result<Vec<WinnerFrequency>>
where
    C: ConnectionTrait,
{
    let draws = Draw::find().all(db).await?;

    let mut by_member: HashMap<i64, WinnerFrequency> = HashMap::new();
    for d in draws {
        by_member
            .entry(d.winner_id)
            .or_insert_with(|| WinnerFrequency {
                member_id: d.winner_id,
                winner_name: d.winner_name.clone(),
                wins: 0,
            })
            .wins += 1;
    }

    let mut frequency: Vec<WinnerFrequency> = by_member.into_values().collect();
    frequency.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| a.winner_name.cmp(&b.winner_name))
    });
    Ok(frequency)
}

/// Builds a payment sheet from already loaded data.
///
/// Every active member gets a row: their stored payment if there is one,
/// otherwise a pending row for `draw.amount_per_member` that is not stored.
/// Stored payments of members who are no longer active are kept on the sheet.
#[must_use]
pub fn build_payment_sheet(
    draw: draw::Model,
    active_members: &[MemberModel],
    payments: Vec<payment::Model>,
) -> PaymentSheet {
    let mut by_member: HashMap<i64, payment::Model> =
        payments.into_iter().map(|p| (p.member_id, p)).collect();

    let member_ids: BTreeSet<i64> = active_members
        .iter()
        .map(|m| m.id)
        .chain(by_member.keys().copied())
        .collect();
    let names: HashMap<i64, &str> = active_members
        .iter()
        .map(|m| (m.id, m.name.as_str()))
        .collect();

    let rows: Vec<PaymentSheetRow> = member_ids
        .into_iter()
        .map(|member_id| match by_member.remove(&member_id) {
            Some(p) => PaymentSheetRow {
                member_id,
                member_name: p.member_name,
                amount: p.amount,
                status: p.status,
                date: p.date,
                transaction_id: p.transaction_id,
                is_recorded: true,
            },
            None => PaymentSheetRow {
                member_id,
                member_name: names.get(&member_id).copied().unwrap_or_default().to_string(),
                amount: draw.amount_per_member,
                status: PaymentStatus::Pending,
                date: None,
                transaction_id: String::new(),
                is_recorded: false,
            },
        })
        .collect();

    let collected: f64 = rows
        .iter()
        .filter(|r| r.status == PaymentStatus::Completed)
        .map(|r| r.amount)
        .sum();
    let pending: f64 = rows
        .iter()
        .filter(|r| r.status == PaymentStatus::Pending)
        .map(|r| r.amount)
        .sum();
    let all_completed =
        !rows.is_empty() && rows.iter().all(|r| r.status == PaymentStatus::Completed);

    PaymentSheet {
        draw,
        rows,
        collected,
        pending,
        progress_percent: calculate_progress(collected, collected + pending),
        all_completed,
    }
}

/// Loads the payment sheet of a draw.
pub async fn draw_payment_sheet<C>(db: &C, draw_id: i64) -> Result<PaymentSheet>
where
    C: ConnectionTrait,
{
    let draw = require_draw(db, draw_id).await?;
    let active_members = list_active_members(db).await?;
    let payments = list_payments_for_draw(db, draw_id).await?;

    Ok(build_payment_sheet(draw, &active_members, payments))
}

/// Calculates what percentage `part` is of `whole`.
///
/// # Returns
/// Progress percentage (0-100), 0 when `whole` is zero
#[must_use]
pub fn calculate_progress(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }

    (part / whole) * 100.0
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80%`
///
/// # Arguments
/// * `progress_percent` - Progress percentage (0-100)
/// * `bar_length` - Length of the progress bar in characters (default 10)
///
/// # Returns
/// Formatted progress bar string
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // Cast safety: clamped_progress ∈ [0, 100], length is small (10-20).
    // Result is mathematically in [0, length], truncation/sign loss intentional for display.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);

    format!("[{filled_str}{empty_str}] {progress_percent:.1}%")
}

/// Formats an amount with its currency, e.g. "INR 4000.00".
#[must_use]
pub fn format_amount(amount: f64, currency: &str) -> String {
    format!("{currency} {amount:.2}")
}

/// Renders a payment sheet as one line per member plus a progress footer.
#[must_use]
pub fn format_payment_sheet(sheet: &PaymentSheet, currency: &str) -> String {
    let mut text = format!(
        "Payments for {} (winner: {})\n",
        sheet.draw.month, sheet.draw.winner_name
    );

    // write! is infallible when writing to String
    for row in &sheet.rows {
        let date = row
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let marker = if row.is_recorded { "" } else { " (not recorded)" };
        let _ = writeln!(
            text,
            "  {:<4} {:<24} {:>14} {:<9} {:<10} {}{}",
            row.member_id,
            row.member_name,
            format_amount(row.amount, currency),
            row.status,
            date,
            row.transaction_id,
            marker
        );
    }

    let _ = writeln!(
        text,
        "Collected {} / pending {}",
        format_amount(sheet.collected, currency),
        format_amount(sheet.pending, currency)
    );
    let _ = writeln!(text, "{}", format_progress_bar(sheet.progress_percent, None));
    if sheet.all_completed {
        text.push_str("All payments completed\n");
    }

    text
}

/// Renders club statistics.
#[must_use]
pub fn format_club_stats(stats: &ClubStats, currency: &str) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "Members: {} ({} active, {} inactive)",
        stats.total_members, stats.active_members, stats.inactive_members
    );
    let _ = writeln!(
        text,
        "Draws: {} ({} g gold, {})",
        stats.total_draws,
        stats.gold_distributed_grams,
        format_amount(stats.total_prize_value, currency)
    );
    let _ = writeln!(
        text,
        "Average gold price: {}/g",
        format_amount(stats.average_gold_price, currency)
    );
    text
}
