//! Account command handlers

use super::parse_permissions;
use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_user_create(config: Config, username: &str, password: &str) -> anyhow::Result<()> {
    let shared = SharedState::new(config).await?;
    let account = shared
        .account_service
        .create_account(username, password)
        .await?;

    println!("✓ Created user '{}' (ID: {})", account.username, account.id);
    if account.is_superuser {
        println!("  First account: promoted to superuser and staff.");
    }
    Ok(())
}

pub async fn cmd_user_delete(config: Config, username: &str) -> anyhow::Result<()> {
    let shared = SharedState::new(config).await?;
    shared.account_service.delete_account(username).await?;

    println!("✓ Deleted user '{username}'");
    Ok(())
}

pub async fn cmd_user_list(config: Config, json: bool) -> anyhow::Result<()> {
    let shared = SharedState::new(config).await?;
    let accounts = shared.account_service.list_accounts().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
        return Ok(());
    }

    if accounts.is_empty() {
        println!("No users yet.");
        println!();
        println!("Create one with: moduletrack user create <username> --password <password>");
        return Ok(());
    }

    println!("Users ({} total)", accounts.len());
    println!("{:-<70}", "");

    for account in accounts {
        let mut flags = Vec::new();
        if account.is_superuser {
            flags.push("superuser");
        }
        if account.is_staff {
            flags.push("staff");
        }
        if !account.is_active {
            flags.push("inactive");
        }

        println!(
            "{:>4}  {:<30} {}",
            account.id,
            account.username,
            flags.join(", ")
        );
    }

    Ok(())
}

pub async fn cmd_user_grant(
    config: Config,
    username: &str,
    permissions: &[String],
) -> anyhow::Result<()> {
    let permissions = parse_permissions(permissions)?;
    let shared = SharedState::new(config).await?;
    let granted = shared.account_service.grant(username, &permissions).await?;

    println!("✓ Granted {granted} new permission(s) to '{username}'");
    Ok(())
}

pub async fn cmd_user_revoke(
    config: Config,
    username: &str,
    permissions: &[String],
) -> anyhow::Result<()> {
    let permissions = parse_permissions(permissions)?;
    let shared = SharedState::new(config).await?;
    let revoked = shared.account_service.revoke(username, &permissions).await?;

    println!("✓ Revoked {revoked} permission(s) from '{username}'");
    Ok(())
}

pub async fn cmd_user_set_active(
    config: Config,
    username: &str,
    is_active: bool,
) -> anyhow::Result<()> {
    let shared = SharedState::new(config).await?;
    shared
        .account_service
        .set_active(username, is_active)
        .await?;

    let state = if is_active { "activated" } else { "deactivated" };
    println!("✓ User '{username}' {state}");
    Ok(())
}
