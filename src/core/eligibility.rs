//! Draw eligibility.
//!
//! A member may be drawn while they are active and have never won. Winning
//! is permanent: there is no rotation reset short of clearing the draw
//! history. Once everyone active has won, the eligible set is empty and the
//! draw engine refuses to run.

use crate::{
    entities::{Draw, Member, draw, member},
    errors::Result,
};
use sea_orm::{QueryOrder, prelude::*};
use std::collections::HashSet;
use tracing::debug;

/// Filters `members` down to those who may be selected in the next draw.
#[must_use]
pub fn resolve_eligible(members: Vec<member::Model>, draws: &[draw::Model]) -> Vec<member::Model> {
    let previous_winners: HashSet<i64> = draws.iter().map(|d| d.winner_id).collect();

    members
        .into_iter()
        .filter(|m| m.is_active && !m.is_deleted && !previous_winners.contains(&m.id))
        .collect()
}

/// Loads members and draw history and returns the members eligible for the
/// next draw, ordered by id. Always reads fresh state.
pub async fn eligible_members<C>(db: &C) -> Result<Vec<member::Model>>
where
    C: ConnectionTrait,
{
    let members = Member::find()
        .order_by_asc(member::Column::Id)
        .all(db)
        .await?;
    let draws = Draw::find().all(db).await?;

    let eligible = resolve_eligible(members, &draws);
    debug!(
        "{} eligible members after {} previous draws",
        eligible.len(),
        draws.len()
    );
    Ok(eligible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::member::{delete_member, set_member_active};
    use crate::test_utils::*;

    #[test]
    fn test_resolve_excludes_previous_winners() {
        let members = vec![
            member_fixture(1, "Asha", true),
            member_fixture(2, "Ravi", true),
            member_fixture(3, "Neha", true),
        ];
        let draws = vec![draw_fixture(10, "2024-01", 2)];

        let eligible = resolve_eligible(members, &draws);
        let ids: Vec<i64> = eligible.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_resolve_excludes_inactive_even_if_never_drawn() {
        let members = vec![
            member_fixture(1, "Asha", false),
            member_fixture(2, "Ravi", true),
        ];

        let eligible = resolve_eligible(members, &[]);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, 2);
    }

    #[test]
    fn test_resolve_excludes_removed_members() {
        let mut removed = member_fixture(1, "Asha", true);
        removed.is_deleted = true;

        assert!(resolve_eligible(vec![removed], &[]).is_empty());
    }

    #[test]
    fn test_resolve_full_rotation_is_empty() {
        let members = vec![member_fixture(1, "Asha", true), member_fixture(2, "Ravi", true)];
        let draws = vec![draw_fixture(10, "2024-01", 1), draw_fixture(11, "2024-02", 2)];

        assert!(resolve_eligible(members, &draws).is_empty());
    }

    #[tokio::test]
    async fn test_eligible_members_recomputed_after_each_change() -> Result<()> {
        let db = setup_test_db().await?;
        let members = create_test_members(&db, 3).await?;

        assert_eq!(eligible_members(&db).await?.len(), 3);

        // A win removes the member for good, no matter how often we ask
        insert_test_draw(&db, "2024-01", &members[0]).await?;
        for _ in 0..3 {
            let eligible = eligible_members(&db).await?;
            assert!(eligible.iter().all(|m| m.id != members[0].id));
            assert_eq!(eligible.len(), 2);
        }

        set_member_active(&db, members[1].id, false).await?;
        let eligible = eligible_members(&db).await?;
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, members[2].id);

        delete_member(&db, members[2].id).await?;
        assert!(eligible_members(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_reactivated_winner_stays_ineligible() -> Result<()> {
        let db = setup_test_db().await?;
        let members = create_test_members(&db, 2).await?;

        insert_test_draw(&db, "2024-01", &members[0]).await?;
        set_member_active(&db, members[0].id, false).await?;
        set_member_active(&db, members[0].id, true).await?;

        let eligible = eligible_members(&db).await?;
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].id, members[1].id);

        Ok(())
    }
}
