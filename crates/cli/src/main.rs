//! Bizdesk CLI - Database migrations and account provisioning.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bizdesk migrate
//!
//! # Create an API login account (password read from the environment)
//! BIZDESK_ACCOUNT_PASSWORD=... bizdesk account create -u alice -e alice@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `account create` - Create an API login account

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bizdesk")]
#[command(author, version, about = "Bizdesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage API login accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a new login account
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Optional contact email
        #[arg(short, long)]
        email: Option<String>,

        /// Password (prefer the environment variable over the flag)
        #[arg(long, env = "BIZDESK_ACCOUNT_PASSWORD", hide_env_values = true)]
        password: String,
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
        Commands::Account { action } => match action {
            AccountAction::Create {
                username,
                email,
                password,
            } => {
                commands::account::create(username, email, password).await?;
            }
        },
    }
    Ok(())
}
