//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use escala_server::db::migrations;

use super::DatabaseArgs;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Create missing tables and indexes, then exit
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let store = args.database.connect().await?;
    migrations::run(store.pool())
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Schema is up to date");
    Ok(())
}
