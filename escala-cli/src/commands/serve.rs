//! HTTP server command
//!
//! Runs the API against PostgreSQL (migrating the schema first) or, with
//! `--memory`, against a throwaway in-process store.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use escala_server::db::{migrations, MemoryStore, Store};
use escala_server::{run_server, AppState, ServerConfig};

use super::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host name or address to bind
    #[arg(long, env = "HOST", default_value = "localhost")]
    pub host: String,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Keep all data in memory instead of PostgreSQL (lost on exit)
    #[arg(long)]
    pub memory: bool,

    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let store: Arc<dyn Store> = if args.memory {
        tracing::warn!("Using in-memory store - data will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        let store = args.database.connect().await?;
        migrations::run(store.pool())
            .await
            .context("Failed to run migrations")?;
        Arc::new(store)
    };

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        cors_permissive: args.cors_permissive,
    };
    tracing::info!(host = %config.host, port = config.port, "Starting escala server");

    // Run server (blocks until shutdown)
    run_server(AppState::new(store), config)
        .await
        .context("Server error")?;

    Ok(())
}
