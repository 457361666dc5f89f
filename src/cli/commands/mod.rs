mod groups;
mod seed;
mod serve;
mod users;

pub use groups::{cmd_group_add_member, cmd_group_grant};
pub use seed::cmd_seed;
pub use serve::cmd_serve;
pub use users::{
    cmd_user_create, cmd_user_delete, cmd_user_grant, cmd_user_list, cmd_user_revoke,
    cmd_user_set_active,
};

use crate::domain::Permission;

/// Parses every permission argument, failing on the first unknown one.
pub(crate) fn parse_permissions(raw: &[String]) -> anyhow::Result<Vec<Permission>> {
    raw.iter()
        .map(|p| p.parse::<Permission>().map_err(anyhow::Error::from))
        .collect()
}
