//! Folio CLI - Database migrations and admin management.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! folio-cli migrate
//!
//! # Grant console access to an identity-provider account
//! folio-cli admin grant -u <uid> -e owner@example.com -n "Site Owner" -r owner
//!
//! # Revoke access
//! folio-cli admin revoke -u <uid>
//!
//! # List admins
//! folio-cli admin list
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin grant|revoke|list` - Manage who may sign in to the console

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "folio-cli")]
#[command(author, version, about = "Folio admin console CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run admin database migrations
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Debug, Subcommand)]
enum AdminAction {
    /// Grant (or update) console access for an identity-provider account
    Grant {
        /// Identity-provider user id
        #[arg(short, long)]
        uid: String,

        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin role (`owner`, `editor`)
        #[arg(short, long, default_value = "editor")]
        role: String,
    },
    /// Revoke console access
    Revoke {
        /// Identity-provider user id
        #[arg(short, long)]
        uid: String,
    },
    /// List admins
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::admin().await?,
        Commands::Admin { action } => match action {
            AdminAction::Grant {
                uid,
                email,
                name,
                role,
            } => {
                commands::admin::grant(&uid, &email, &name, &role).await?;
            }
            AdminAction::Revoke { uid } => commands::admin::revoke(&uid).await?,
            AdminAction::List => commands::admin::list().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn grant_defaults_to_editor() {
        let cli = Cli::try_parse_from([
            "folio-cli", "admin", "grant", "-u", "abc123", "-e", "a@b.com", "-n", "Ada",
        ])
        .unwrap();
        match cli.command {
            Commands::Admin {
                action: AdminAction::Grant { role, uid, .. },
            } => {
                assert_eq!(role, "editor");
                assert_eq!(uid, "abc123");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn revoke_requires_uid() {
        assert!(Cli::try_parse_from(["folio-cli", "admin", "revoke"]).is_err());
    }
}
