// ABOUTME: Server binary for the Courtbook reservation and pricing API
// ABOUTME: Loads configuration, opens the database and serves HTTP until Ctrl-C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Courtbook Contributors

//! # Courtbook API Server Binary
//!
//! ```bash
//! courtbook-server --http-port 8081 --database-url sqlite:./data/courtbook.db
//! ```

use anyhow::Result;
use clap::Parser;
use courtbook_server::{
    clock::SystemClock,
    config::{environment::ServerConfig, DatabaseUrl},
    database::Database,
    logging,
    resources::ServerResources,
    server::CourtbookServer,
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "courtbook-server")]
#[command(about = "Courtbook API - court availability, dynamic pricing and bookings")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (`sqlite:path` or `sqlite::memory:`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = DatabaseUrl::parse_url(&database_url)?;
    }

    info!("Starting Courtbook API");
    info!("{}", config.summary());

    let database = Database::new(&config.database).await?;
    info!("Database ready: {}", config.database.url);

    let resources = ServerResources::new(database, Arc::new(config), Arc::new(SystemClock)).await?;
    let server = CourtbookServer::new(Arc::new(resources));

    if let Err(e) = server.run(shutdown_signal()).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Courtbook API shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining in-flight requests"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C, serving until killed: {e}");
            std::future::pending::<()>().await;
        }
    }
}
