//! `nikctl`: operator commands for the NIK confirmation service.
//!
//! Reads the same environment (and `.env`) as the API server.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "nikctl")]
#[command(version, about = "Operator tools for the NIK confirmation service", long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the local mirror with the SAP feed
    Sync(commands::SyncArgs),
    /// Show freshness statistics of the local mirror
    Stats,
    /// Delete every locally mirrored confirmation
    Clear,
    /// Create a local account
    CreateUser(commands::CreateUserArgs),
    /// Disable a local account; its sessions stop working immediately
    DeactivateUser(commands::DeactivateUserArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nikctl=info,nik_sync=info,nik_sap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let pool = nik_db::create_pool(&cli.database_url)
        .await
        .context("Failed to connect to database")?;
    nik_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    match cli.command {
        Commands::Sync(args) => commands::sync(pool, args).await,
        Commands::Stats => commands::stats(pool).await,
        Commands::Clear => commands::clear(pool).await,
        Commands::CreateUser(args) => commands::create_user(pool, args).await,
        Commands::DeactivateUser(args) => commands::deactivate_user(pool, args).await,
    }
}
