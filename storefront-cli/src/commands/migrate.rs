//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use storefront_server::db::{create_pool, migrations};

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://data.db")]
    pub database_url: String,
}

/// Create any missing tables and indexes
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let pool = create_pool(&args.database_url)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    pool.close().await;
    tracing::info!(database = %args.database_url, "database schema up to date");
    Ok(())
}
