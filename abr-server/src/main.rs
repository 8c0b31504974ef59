use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use abr_core::AbrConfig;
use abr_server::db::create_pool;
use abr_server::tracing_setup::{init_tracing, TracingConfig};
use abr_server::{run_server, ServerConfig};
use anyhow::{Context, Result};
use clap::Parser;

/// Tab-order preference service for the ABR dashboard
#[derive(Parser, Debug)]
#[command(name = "abr-server", version, about)]
struct Cli {
    /// Address to bind (overrides [server].bind)
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// SQLite database URL (overrides [server].database_url and ABR_DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Allow any CORS origin (development only)
    #[arg(long)]
    cors_permissive: bool,

    /// Config file (default: $ABR_CONFIG or ~/.abr/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&TracingConfig { debug: cli.debug })?;

    let file_config = match &cli.config {
        Some(path) => AbrConfig::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AbrConfig::load().context("failed to load config")?,
    };

    let mut config = ServerConfig::from_config(&file_config)?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout = Duration::from_secs(timeout);
    }
    config.cors_permissive |= cli.cors_permissive;

    let database_url = cli
        .database_url
        .unwrap_or_else(|| file_config.server.database_url.clone());
    let pool = create_pool(&database_url)
        .await
        .with_context(|| format!("failed to open database {}", database_url))?;

    run_server(pool, config).await?;
    Ok(())
}
