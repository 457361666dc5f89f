//! Group command handlers

use super::parse_permissions;
use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_group_add_member(config: Config, group: &str, username: &str) -> anyhow::Result<()> {
    let shared = SharedState::new(config).await?;

    if shared.account_service.add_to_group(group, username).await? {
        println!("✓ Added '{username}' to group '{group}'");
    } else {
        println!("'{username}' is already a member of '{group}'");
    }
    Ok(())
}

pub async fn cmd_group_grant(
    config: Config,
    group: &str,
    permissions: &[String],
) -> anyhow::Result<()> {
    let permissions = parse_permissions(permissions)?;
    let shared = SharedState::new(config).await?;
    let granted = shared
        .account_service
        .grant_group(group, &permissions)
        .await?;

    println!("✓ Granted {granted} new permission(s) to group '{group}'");
    Ok(())
}
