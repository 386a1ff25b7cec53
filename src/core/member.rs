//! Member business logic - Handles the club's member registry.
//!
//! Provides functions for creating, retrieving, updating and removing members.
//! Removal is a soft delete so that draws and payments that reference a member
//! keep resolving. All functions are async and return Result types for error handling.

use crate::{
    entities::{Member, member},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

const ENTITY: &str = "Member";

/// Partial update of a member's details. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct MemberUpdate {
    /// New display name
    pub name: Option<String>,
    /// New phone number
    pub phone: Option<String>,
    /// New email; `Some(None)` clears it
    pub email: Option<Option<String>>,
    /// New active flag
    pub is_active: Option<bool>,
}

fn required_field(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput {
            message: format!("Member {field} cannot be empty"),
        });
    }
    Ok(trimmed.to_string())
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

/// Retrieves all members that have not been removed, newest first.
pub async fn list_members<C>(db: &C) -> Result<Vec<member::Model>>
where
    C: ConnectionTrait,
{
    Member::find()
        .filter(member::Column::IsDeleted.eq(false))
        .order_by_desc(member::Column::JoinedDate)
        .order_by_desc(member::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the members who currently take part in draws and payments,
/// ordered by id.
pub async fn list_active_members<C>(db: &C) -> Result<Vec<member::Model>>
where
    C: ConnectionTrait,
{
    Member::find()
        .filter(member::Column::IsActive.eq(true))
        .filter(member::Column::IsDeleted.eq(false))
        .order_by_asc(member::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Counts active members. This is the divisor for every member's share of a prize.
pub async fn count_active_members<C>(db: &C) -> Result<u64>
where
    C: ConnectionTrait,
{
    Member::find()
        .filter(member::Column::IsActive.eq(true))
        .filter(member::Column::IsDeleted.eq(false))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Finds a member by id. Removed members are still returned because
/// historical draws and payments refer to them.
pub async fn get_member_by_id<C>(db: &C, member_id: i64) -> Result<Option<member::Model>>
where
    C: ConnectionTrait,
{
    Member::find_by_id(member_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_member_by_id`] but an unknown id is an [`Error::InvalidReference`].
pub async fn require_member<C>(db: &C, member_id: i64) -> Result<member::Model>
where
    C: ConnectionTrait,
{
    get_member_by_id(db, member_id)
        .await?
        .ok_or(Error::InvalidReference {
            entity: ENTITY,
            id: member_id,
        })
}

/// Creates a new active member, trimming the name and phone and lower-casing the email.
#[instrument(skip(db))]
pub async fn create_member<C>(
    db: &C,
    name: &str,
    phone: &str,
    email: Option<String>,
) -> Result<member::Model>
where
    C: ConnectionTrait,
{
    let name = required_field("name", name)?;
    let phone = required_field("phone", phone)?;

    let member = member::ActiveModel {
        name: Set(name),
        phone: Set(phone),
        email: Set(normalize_email(email)),
        is_active: Set(true),
        is_deleted: Set(false),
        joined_date: Set(Utc::now()),
        ..Default::default()
    };

    let result = member.insert(db).await?;
    info!("Registered member {} ({})", result.name, result.id);
    Ok(result)
}

/// Applies a partial update to a member that has not been removed.
#[instrument(skip(db))]
pub async fn update_member<C>(
    db: &C,
    member_id: i64,
    update: MemberUpdate,
) -> Result<member::Model>
where
    C: ConnectionTrait,
{
    let existing = require_member(db, member_id).await?;
    if existing.is_deleted {
        return Err(Error::InvalidReference {
            entity: ENTITY,
            id: member_id,
        });
    }

    let mut active_model: member::ActiveModel = existing.into();
    if let Some(name) = update.name {
        active_model.name = Set(required_field("name", &name)?);
    }
    if let Some(phone) = update.phone {
        active_model.phone = Set(required_field("phone", &phone)?);
    }
    if let Some(email) = update.email {
        active_model.email = Set(normalize_email(email));
    }
    if let Some(is_active) = update.is_active {
        active_model.is_active = Set(is_active);
    }

    let updated = active_model.update(db).await?;
    info!("Updated member {} ({})", updated.name, updated.id);
    Ok(updated)
}

/// Activates or deactivates a member. Inactive members are neither drawn nor
/// charged for future draws.
pub async fn set_member_active<C>(db: &C, member_id: i64, is_active: bool) -> Result<member::Model>
where
    C: ConnectionTrait,
{
    update_member(
        db,
        member_id,
        MemberUpdate {
            is_active: Some(is_active),
            ..Default::default()
        },
    )
    .await
}

/// Removes a member from the registry while keeping the record for history.
#[instrument(skip(db))]
pub async fn delete_member<C>(db: &C, member_id: i64) -> Result<member::Model>
where
    C: ConnectionTrait,
{
    let existing = require_member(db, member_id).await?;
    if existing.is_deleted {
        return Err(Error::InvalidReference {
            entity: ENTITY,
            id: member_id,
        });
    }

    let mut active_model: member::ActiveModel = existing.into();
    active_model.is_active = Set(false);
    active_model.is_deleted = Set(true);
    let removed = active_model.update(db).await?;
    info!("Removed member {} ({})", removed.name, removed.id);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_member_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_member(&db, "", "+91 9000000000", None).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));

        let result = create_member(&db, "   ", "+91 9000000000", None).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));

        let result = create_member(&db, "Asha", "  ", None).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_member_integration() -> Result<()> {
        let db = setup_test_db().await?;

        let member = create_member(
            &db,
            "  Asha Patel ",
            " +91 9000000001 ",
            Some(" Asha@Example.COM ".to_string()),
        )
        .await?;

        assert_eq!(member.name, "Asha Patel");
        assert_eq!(member.phone, "+91 9000000001");
        assert_eq!(member.email.as_deref(), Some("asha@example.com"));
        assert!(member.is_active);
        assert!(!member.is_deleted);

        Ok(())
    }

    #[tokio::test]
    async fn test_blank_email_is_stored_as_none() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_member(&db, "Ravi", "123", Some("   ".to_string())).await?;
        assert!(member.email.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_active_members_excludes_inactive() -> Result<()> {
        let db = setup_test_db().await?;

        let active = create_test_member(&db, "Active").await?;
        let inactive = create_test_member(&db, "Inactive").await?;
        set_member_active(&db, inactive.id, false).await?;

        let members = list_active_members(&db).await?;
        assert_eq!(members, vec![active]);
        assert_eq!(count_active_members(&db).await?, 1);

        // Inactive members still show up in the registry listing
        assert_eq!(list_members(&db).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_member_partial() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "Neha").await?;

        let updated = update_member(
            &db,
            member.id,
            MemberUpdate {
                phone: Some("+91 9111111111".to_string()),
                email: Some(Some("NEHA@example.com".to_string())),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.name, "Neha");
        assert_eq!(updated.phone, "+91 9111111111");
        assert_eq!(updated.email.as_deref(), Some("neha@example.com"));

        let cleared = update_member(
            &db,
            member.id,
            MemberUpdate {
                email: Some(None),
                ..Default::default()
            },
        )
        .await?;
        assert!(cleared.email.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_update_member_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        let result = set_member_active(&db, 999, false).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidReference {
                entity: "Member",
                id: 999
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_member_is_soft() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "Vikram").await?;

        let removed = delete_member(&db, member.id).await?;
        assert!(removed.is_deleted);
        assert!(!removed.is_active);

        // Hidden from listings but still resolvable for history
        assert!(list_members(&db).await?.is_empty());
        assert!(list_active_members(&db).await?.is_empty());
        let retrieved = get_member_by_id(&db, member.id).await?.unwrap();
        assert_eq!(retrieved.name, "Vikram");

        // Removed members cannot be edited or removed again
        let result = set_member_active(&db, member.id, true).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidReference { .. }));
        let result = delete_member(&db, member.id).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidReference { .. }));

        Ok(())
    }
}
