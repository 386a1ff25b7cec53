//! Member management commands - list, add, update, activate, deactivate and
//! remove club members.

use crate::{
    cli::{AppContext, MemberCommand},
    core::member::{
        MemberUpdate, create_member, delete_member, list_members, set_member_active,
        update_member,
    },
    entities::member,
    errors::Result,
};
use std::fmt::Write;

fn describe(m: &member::Model) -> String {
    let state = if m.is_active { "active" } else { "inactive" };
    let email = m.email.as_deref().unwrap_or("-");
    format!(
        "{:<4} {:<24} {:<18} {:<28} {}",
        m.id, m.name, m.phone, email, state
    )
}

/// Runs a member subcommand.
pub async fn run(ctx: &AppContext, command: MemberCommand) -> Result<String> {
    let db = &ctx.database;

    match command {
        MemberCommand::List => {
            let members = list_members(db).await?;
            if members.is_empty() {
                return Ok("No members registered yet.".to_string());
            }

            let mut text = format!("{} members\n", members.len());
            for m in &members {
                let _ = writeln!(text, "{}", describe(m));
            }
            Ok(text)
        }
        MemberCommand::Add { name, phone, email } => {
            let created = create_member(db, &name, &phone, email).await?;
            Ok(format!("Added member {}", describe(&created)))
        }
        MemberCommand::Update {
            id,
            name,
            phone,
            email,
        } => {
            let update = MemberUpdate {
                name,
                phone,
                email: email.map(Some),
                is_active: None,
            };
            let updated = update_member(db, id, update).await?;
            Ok(format!("Updated member {}", describe(&updated)))
        }
        MemberCommand::Activate { id } => {
            let updated = set_member_active(db, id, true).await?;
            Ok(format!("{} is now active", updated.name))
        }
        MemberCommand::Deactivate { id } => {
            let updated = set_member_active(db, id, false).await?;
            Ok(format!("{} is now inactive", updated.name))
        }
        MemberCommand::Remove { id } => {
            let removed = delete_member(db, id).await?;
            Ok(format!("Removed {} from the club", removed.name))
        }
    }
}
