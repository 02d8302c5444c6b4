//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT};

/// Storefront - E-commerce REST backend
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage admin accounts
    Admin(AdminArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_SERVER_HOST, env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_SERVER_PORT, env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Roll back applied migrations, newest first
    Down {
        /// Number of migrations to roll back
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Show which migrations are applied
    Status,
    /// Drop every table and re-run all migrations
    Fresh {
        /// Confirm that all store data may be discarded
        #[arg(long)]
        force: bool,
    },
}

/// Arguments for the admin command
#[derive(Parser, Debug)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub action: AdminAction,
}

#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Create an admin account, or promote an existing one by email
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["storefront", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, DEFAULT_SERVER_PORT);
                assert!(!cli.verbose);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_admin_create() {
        let cli = Cli::try_parse_from([
            "storefront",
            "-v",
            "admin",
            "create",
            "--name",
            "Root",
            "--email",
            "root@example.com",
            "--password",
            "longenough",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Admin(AdminArgs { action: AdminAction::Create { ref email, .. } })
                if email == "root@example.com"
        ));
    }

    #[test]
    fn test_migrate_down_steps_and_fresh_guard() {
        let cli = Cli::try_parse_from(["storefront", "migrate", "down", "--steps", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Migrate(MigrateArgs { action: MigrateAction::Down { steps: 3 } })
        ));

        let cli = Cli::try_parse_from(["storefront", "migrate", "fresh"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Migrate(MigrateArgs { action: MigrateAction::Fresh { force: false } })
        ));
    }
}
