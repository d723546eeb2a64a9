//! Jewelbox CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! jb-cli migrate
//!
//! # Create an admin account (password from JB_USER_PASSWORD)
//! jb-cli user create -e admin@example.com -n "Shop Admin" -r admin
//!
//! # Load packaging options
//! jb-cli seed packaging data/packaging.yaml
//! ```
//!
//! All commands read `DATABASE_URL` from the environment or `.env`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "jb-cli")]
#[command(author, version, about = "Jewelbox CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Load seed data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`customer` or `admin`)
        #[arg(short, long, default_value = "customer")]
        role: String,

        /// Password; falls back to `JB_USER_PASSWORD`
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert or update packaging options from a YAML file
    Packaging {
        /// Path to the YAML file
        file: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

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
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::user::create(&email, &name, &role, password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Packaging { file } => commands::seed::packaging(&file).await?,
        },
    }
    Ok(())
}
