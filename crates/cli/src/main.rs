//! Civic Desk CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! desk-cli migrate
//!
//! # Load the demo accounts, citizens and complaints
//! desk-cli seed
//!
//! # Wipe and reload the demo data
//! desk-cli seed --reset
//!
//! # Create a worker
//! desk-cli worker create -u lisa.chen -n "Lisa Chen" \
//!     -e lisa.chen@municipality.gov -d "Waste Management" --password '...'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Load the fixture data set
//! - `worker create` / `worker list` - Manage Lower Admin accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use civic_desk_core::WorkerDraft;

mod commands;

#[derive(Parser)]
#[command(name = "desk-cli")]
#[command(author, version, about = "Civic Desk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo data
    Seed {
        /// Delete existing admins, citizens and complaints first
        #[arg(long)]
        reset: bool,
    },
    /// Manage worker accounts
    Worker {
        #[command(subcommand)]
        action: WorkerAction,
    },
}

#[derive(Subcommand)]
enum WorkerAction {
    /// Create a new worker
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Department the worker belongs to
        #[arg(short, long)]
        department: String,

        /// Initial password
        #[arg(long, env = "DESK_WORKER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List active workers
    List {
        /// Only workers in this department
        #[arg(short, long)]
        department: Option<String>,
    },
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { reset } => commands::seed::fixtures(reset).await?,
        Commands::Worker { action } => match action {
            WorkerAction::Create {
                username,
                name,
                email,
                department,
                password,
            } => {
                let draft = WorkerDraft {
                    username,
                    password,
                    name,
                    email,
                    department,
                };
                commands::worker::create(draft).await?;
            }
            WorkerAction::List { department } => {
                commands::worker::list(department.as_deref()).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_worker_create() {
        let cli = Cli::try_parse_from([
            "desk-cli", "worker", "create", "-u", "ana.rodriguez", "-n", "Ana Rodriguez", "-e",
            "ana@municipality.gov", "-d", "Traffic Management", "--password", "secret-pass",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        let Commands::Worker {
            action: WorkerAction::Create { department, .. },
        } = cli.command
        else {
            panic!("expected worker create");
        };
        assert_eq!(department, "Traffic Management");
    }

    #[test]
    fn test_parse_seed_reset() {
        let cli = Cli::try_parse_from(["desk-cli", "seed", "--reset"]).unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(cli.command, Commands::Seed { reset: true }));
    }
}
