use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};
use std::collections::BTreeSet;

use crate::entities::{group_members, group_permissions, prelude::*, user_permissions};

/// Direct and group-derived permission grants, stored as qualified codenames.
pub struct PermissionRepository {
    conn: DatabaseConnection,
}

impl PermissionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns `false` when the grant already existed.
    pub async fn grant_user(&self, user_id: i32, codename: &str) -> Result<bool> {
        let existing = UserPermissions::find()
            .filter(user_permissions::Column::UserId.eq(user_id))
            .filter(user_permissions::Column::Codename.eq(codename))
            .one(&self.conn)
            .await
            .context("Failed to query user permission")?;

        if existing.is_some() {
            return Ok(false);
        }

        user_permissions::ActiveModel {
            user_id: Set(user_id),
            codename: Set(codename.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to grant user permission")?;

        Ok(true)
    }

    /// Returns `false` when there was nothing to revoke.
    pub async fn revoke_user(&self, user_id: i32, codename: &str) -> Result<bool> {
        let result = UserPermissions::delete_many()
            .filter(user_permissions::Column::UserId.eq(user_id))
            .filter(user_permissions::Column::Codename.eq(codename))
            .exec(&self.conn)
            .await
            .context("Failed to revoke user permission")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn grant_group(&self, group_id: i32, codename: &str) -> Result<bool> {
        let existing = GroupPermissions::find()
            .filter(group_permissions::Column::GroupId.eq(group_id))
            .filter(group_permissions::Column::Codename.eq(codename))
            .one(&self.conn)
            .await
            .context("Failed to query group permission")?;

        if existing.is_some() {
            return Ok(false);
        }

        group_permissions::ActiveModel {
            group_id: Set(group_id),
            codename: Set(codename.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to grant group permission")?;

        Ok(true)
    }

    /// Union of the user's direct grants and the grants of every group the
    /// user belongs to.
    pub async fn effective_for_user(&self, user_id: i32) -> Result<BTreeSet<String>> {
        let direct = self.direct_for_user(user_id).await?;

        let group_ids = self.group_ids_for_user(user_id).await?;

        let inherited: Vec<String> = if group_ids.is_empty() {
            Vec::new()
        } else {
            GroupPermissions::find()
                .select_only()
                .column(group_permissions::Column::Codename)
                .filter(group_permissions::Column::GroupId.is_in(group_ids))
                .into_tuple()
                .all(&self.conn)
                .await
                .context("Failed to load group permissions")?
        };

        Ok(direct.into_iter().chain(inherited).collect())
    }

    /// Grants held by the user itself, ignoring groups.
    pub async fn direct_for_user(&self, user_id: i32) -> Result<BTreeSet<String>> {
        let codenames: Vec<String> = UserPermissions::find()
            .select_only()
            .column(user_permissions::Column::Codename)
            .filter(user_permissions::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to load user permissions")?;

        Ok(codenames.into_iter().collect())
    }

    async fn group_ids_for_user(&self, user_id: i32) -> Result<Vec<i32>> {
        GroupMembers::find()
            .select_only()
            .column(group_members::Column::GroupId)
            .filter(group_members::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to load group memberships")
    }
}
