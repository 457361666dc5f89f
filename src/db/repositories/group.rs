use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::BTreeSet;

use crate::entities::{group_members, groups, prelude::*};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: i32,
    pub name: String,
}

impl From<groups::Model> for Group {
    fn from(model: groups::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

pub struct GroupRepository {
    conn: DatabaseConnection,
}

impl GroupRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Group>> {
        let group = Groups::find()
            .filter(groups::Column::Name.eq(name))
            .one(&self.conn)
            .await
            .context("Failed to query group by name")?;

        Ok(group.map(Group::from))
    }

    pub async fn get_or_create(&self, name: &str) -> Result<Group> {
        if let Some(group) = self.find_by_name(name).await? {
            return Ok(group);
        }

        let model = groups::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to create group")?;

        Ok(model.into())
    }

    /// Returns `false` when the user was already a member.
    pub async fn add_member(&self, group_id: i32, user_id: i32) -> Result<bool> {
        let existing = GroupMembers::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .filter(group_members::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query group membership")?;

        if existing.is_some() {
            return Ok(false);
        }

        group_members::ActiveModel {
            group_id: Set(group_id),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to add group member")?;

        Ok(true)
    }

    pub async fn names_for_user(&self, user_id: i32) -> Result<BTreeSet<String>> {
        let groups = Groups::find()
            .inner_join(GroupMembers)
            .filter(group_members::Column::UserId.eq(user_id))
            .order_by_asc(groups::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to load groups for user")?;

        Ok(groups.into_iter().map(|g| g.name).collect())
    }
}
