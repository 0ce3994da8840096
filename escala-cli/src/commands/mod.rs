//! Command implementations for the escala CLI

pub mod migrate;
pub mod serve;

pub use migrate::run_migrate;
pub use serve::run_serve;

use anyhow::{Context, Result};
use clap::Args;
use escala_server::db::{create_pool_with_options, PgStore, DEFAULT_MAX_CONNECTIONS};

/// Database connection options shared by every command that needs one
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Maximum pooled connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
}

impl DatabaseArgs {
    /// Open a pool and wrap it in a store.
    pub async fn connect(&self) -> Result<PgStore> {
        let url = self
            .database_url
            .as_deref()
            .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env or .env")?;
        let pool = create_pool_with_options(url, self.max_connections)
            .await
            .context("Failed to create database pool")?;
        Ok(PgStore::new(pool))
    }
}
