//! CLI module - Command-line interface for `ModuleTrack`
//!
//! This module provides a structured CLI using clap for argument parsing.

pub mod commands;

use clap::{Parser, Subcommand};

use crate::constants::seed::DEFAULT_DUMMY_COUNT;

/// `ModuleTrack` - PCB type registry
#[derive(Parser, Debug)]
#[command(name = "moduletrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web server until Ctrl+C
    #[command(alias = "daemon")]
    Serve,

    /// Create numbered dummy PCB types
    Seed {
        /// How many records to create
        #[arg(long, short = 'n', default_value_t = DEFAULT_DUMMY_COUNT)]
        count: u32,
    },

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage groups
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Create default config file
    Init,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create an account. The first account becomes superuser.
    Create {
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Delete an account
    #[command(alias = "rm")]
    Delete { username: String },

    /// List accounts
    #[command(alias = "ls")]
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Grant permissions, e.g. `view` or `moduletrack.add_pcbtype`
    Grant {
        username: String,
        #[arg(required = true)]
        permissions: Vec<String>,
    },

    /// Revoke directly granted permissions
    Revoke {
        username: String,
        #[arg(required = true)]
        permissions: Vec<String>,
    },

    /// Allow an account to sign in again
    Activate { username: String },

    /// Block an account from signing in without deleting it
    Deactivate { username: String },
}

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Add a user to a group, creating the group if needed
    AddMember { group: String, username: String },

    /// Grant permissions to a group, creating the group if needed
    Grant {
        group: String,
        #[arg(required = true)]
        permissions: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_default_count() {
        let cli = Cli::try_parse_from(["moduletrack", "seed"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Seed { count }) if count == DEFAULT_DUMMY_COUNT
        ));

        let cli = Cli::try_parse_from(["moduletrack", "seed", "--count", "25"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Seed { count: 25 })));
    }

    #[test]
    fn test_parse_daemon_alias_and_grants() {
        let cli = Cli::try_parse_from(["moduletrack", "daemon"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));

        let cli = Cli::try_parse_from(["moduletrack", "user", "grant", "bob", "view", "add"])
            .unwrap();
        match cli.command {
            Some(Commands::User {
                command: UserCommands::Grant {
                    username,
                    permissions,
                },
            }) => {
                assert_eq!(username, "bob");
                assert_eq!(permissions, vec!["view", "add"]);
            }
            other => panic!("unexpected parse: {other:?}"),
        }

        assert!(Cli::try_parse_from(["moduletrack", "user", "grant", "bob"]).is_err());
    }

    #[test]
    fn test_parse_activation_toggles() {
        let cli = Cli::try_parse_from(["moduletrack", "user", "deactivate", "bob"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::User { command: UserCommands::Deactivate { ref username } })
                if username == "bob"
        ));

        let cli = Cli::try_parse_from(["moduletrack", "user", "activate", "bob"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::User { command: UserCommands::Activate { ref username } })
                if username == "bob"
        ));
    }
}
