pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod forms;
pub mod models;
pub mod services;
pub mod state;

use anyhow::Context;
use clap::{CommandFactory, Parser};
pub use config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, GroupCommands, UserCommands, commands};

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    init_tracing(&config)?;

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Serve => commands::cmd_serve(config, prometheus_handle).await,

        Commands::Seed { count } => commands::cmd_seed(config, count).await,

        Commands::User { command } => match command {
            UserCommands::Create { username, password } => {
                commands::cmd_user_create(config, &username, &password).await
            }
            UserCommands::Delete { username } => commands::cmd_user_delete(config, &username).await,
            UserCommands::List { json } => commands::cmd_user_list(config, json).await,
            UserCommands::Grant {
                username,
                permissions,
            } => commands::cmd_user_grant(config, &username, &permissions).await,
            UserCommands::Revoke {
                username,
                permissions,
            } => commands::cmd_user_revoke(config, &username, &permissions).await,
            UserCommands::Activate { username } => {
                commands::cmd_user_set_active(config, &username, true).await
            }
            UserCommands::Deactivate { username } => {
                commands::cmd_user_set_active(config, &username, false).await
            }
        },

        Commands::Group { command } => match command {
            GroupCommands::AddMember { group, username } => {
                commands::cmd_group_add_member(config, &group, &username).await
            }
            GroupCommands::Grant { group, permissions } => {
                commands::cmd_group_grant(config, &group, &permissions).await
            }
        },

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Created config.toml with default settings");
            } else {
                println!("config.toml already exists");
            }
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let (pretty_layer, json_layer) = if config.general.log_format == "json" {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty_layer)
        .with(json_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let mut builder = tracing_loki::builder();
        for (key, value) in &config.observability.loki_labels {
            builder = builder.label(key.as_str(), value.as_str())?;
        }
        let (layer, task) = builder
            .extra_field("version", env!("CARGO_PKG_VERSION"))?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}
