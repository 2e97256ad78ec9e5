use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use sqlx::PgPool;

use nik_api::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use nik_api::config::SapConfig;
use nik_core::nik::format_display_timestamp;
use nik_core::roles::{ROLE_ADMIN, ROLE_USER};
use nik_db::models::user::CreateUser;
use nik_db::repositories::UserRepo;
use nik_sap::{ListFilter, SapGateway};
use nik_sync::SyncJob;

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Only fetch this personnel number
    #[arg(long)]
    pub pernr: Option<String>,

    /// Only fetch this plant
    #[arg(long)]
    pub werks: Option<String>,

    /// Delete all local rows before syncing
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    /// Login name; must match the user's SAP username
    pub username: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: Option<String>,

    /// Local password
    #[arg(long, env = "NIKCTL_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long, default_value = ROLE_USER, value_parser = [ROLE_ADMIN, ROLE_USER])]
    pub role: String,
}

#[derive(Args, Debug)]
pub struct DeactivateUserArgs {
    /// Login name of the account to disable
    pub username: String,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn sync_job(pool: PgPool) -> Result<SyncJob> {
    let sap = SapConfig::from_env();
    let gateway = SapGateway::new(sap.endpoints(), sap.timeout(), sap.retry_policy())
        .context("Failed to build SAP gateway client")?;
    Ok(SyncJob::new(pool, gateway, sap.sync_credentials()))
}

pub async fn sync(pool: PgPool, args: SyncArgs) -> Result<()> {
    let job = sync_job(pool)?;

    if args.clear {
        let deleted = job.clear_all().await?;
        println!("Cleared {deleted} local rows");
    }

    let filter = ListFilter::new(args.pernr.as_deref(), args.werks.as_deref());
    let stats = job.run(&filter).await?;

    println!("Fetched:  {}", stats.fetched);
    println!("Inserted: {}", stats.inserted);
    println!("Deleted:  {}", stats.deleted);
    println!("Skipped:  {}", stats.skipped);
    println!("Errors:   {}", stats.errors);
    Ok(())
}

pub async fn stats(pool: PgPool) -> Result<()> {
    let stats = sync_job(pool)?.statistics().await?;
    let last_sync = format_display_timestamp(stats.last_sync).unwrap_or_else(|| "never".into());

    println!("Total records:     {}", stats.total_records);
    println!("Last sync:         {last_sync}");
    println!("Synced today:      {}", stats.synced_today);
    println!("Synced this week:  {}", stats.synced_this_week);
    println!("Synced this month: {}", stats.synced_this_month);
    Ok(())
}

pub async fn clear(pool: PgPool) -> Result<()> {
    let deleted = sync_job(pool)?.clear_all().await?;
    println!("Cleared {deleted} local rows");
    Ok(())
}

pub async fn create_user(pool: PgPool, args: CreateUserArgs) -> Result<()> {
    let username = args.username.trim();
    if username.is_empty() {
        bail!("Username must not be empty");
    }
    validate_password_strength(&args.password, MIN_PASSWORD_LENGTH).map_err(|e| anyhow!(e))?;
    let password_hash =
        hash_password(&args.password).map_err(|e| anyhow!("Failed to hash password: {e}"))?;

    let input = CreateUser {
        username: username.to_string(),
        name: args.name,
        email: args.email.filter(|e| !e.trim().is_empty()),
        password_hash,
        role: args.role,
    };
    let user = UserRepo::create(&pool, &input)
        .await
        .with_context(|| format!("Failed to create user '{username}'"))?;

    tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "User created");
    println!("Created user {} (id {}, role {})", user.username, user.id, user.role);
    Ok(())
}

pub async fn deactivate_user(pool: PgPool, args: DeactivateUserArgs) -> Result<()> {
    let username = args.username.trim();
    let Some(user) = UserRepo::find_active_by_username(&pool, username).await? else {
        bail!("No active user named '{username}'");
    };

    if UserRepo::deactivate(&pool, user.id).await? {
        tracing::info!(user_id = user.id, username = %user.username, "User deactivated");
    }
    println!("Deactivated user {} (id {})", user.username, user.id);
    Ok(())
}
