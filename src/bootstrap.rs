//! First-account bootstrap rule.
//!
//! Whenever the account population becomes exactly one, that sole account is
//! promoted to superuser and staff. The account store calls
//! [`on_account_event`] from its create and delete paths, inside the same
//! transaction as the triggering write.

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use tracing::info;

use crate::entities::{prelude::*, users};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEvent {
    Created(i32),
    Deleted(i32),
}

/// Applies the rule after `event` and returns the id of the account that
/// was promoted, if any write happened.
pub async fn on_account_event<C: ConnectionTrait>(
    conn: &C,
    event: AccountEvent,
) -> Result<Option<i32>> {
    let population = Users::find()
        .count(conn)
        .await
        .context("Failed to count accounts")?;

    if population != 1 {
        return Ok(None);
    }

    // Re-fetch: after a delete the survivor is not the account in the event.
    let sole = match event {
        AccountEvent::Created(id) => Users::find_by_id(id).one(conn).await?,
        AccountEvent::Deleted(_) => Users::find().order_by_asc(users::Column::Id).one(conn).await?,
    };

    let Some(sole) = sole else {
        return Ok(None);
    };

    promote(conn, sole).await
}

async fn promote<C: ConnectionTrait>(conn: &C, account: users::Model) -> Result<Option<i32>> {
    if account.is_superuser && account.is_staff {
        return Ok(None);
    }

    let id = account.id;
    let username = account.username.clone();

    let mut active: users::ActiveModel = account.into();
    active.is_superuser = Set(true);
    active.is_staff = Set(true);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());
    active
        .update(conn)
        .await
        .context("Failed to promote sole account")?;

    info!(user_id = id, username = %username, "Promoted sole account to superuser");
    Ok(Some(id))
}
