use std::path::PathBuf;
use std::sync::Arc;

use abr_core::{AbrConfig, Role, Session, TabOrderStore, TableOptions};
use abr_tui::tracing_setup::{init_tracing, TracingConfig};
use abr_tui::{terminal, App, AppOptions, HttpTabOrderBackend};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc::unbounded_channel;
use tracing::info;

/// Terminal dashboard for ABR records with draggable, persisted status tabs
#[derive(Parser, Debug)]
#[command(name = "abr-dashboard", version, about)]
struct Cli {
    /// Preference service URL (overrides [dashboard].api_url and ABR_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Signed-in user id (overrides [dashboard].user_id and ABR_USER)
    #[arg(short, long)]
    user: Option<String>,

    /// Session role: admin, manager, technician or viewer
    #[arg(short, long)]
    role: Option<Role>,

    /// Keep tab orders in memory instead of calling the service
    #[arg(long)]
    offline: bool,

    /// Rows per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Config file (default: $ABR_CONFIG or ~/.abr/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AbrConfig::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AbrConfig::load().context("failed to load config")?,
    };
    if let Some(url) = cli.api_url {
        config.dashboard.api_url = url;
    }
    if let Some(user) = cli.user {
        config.dashboard.user_id = user;
    }
    if let Some(role) = cli.role {
        config.dashboard.role = role;
    }
    if let Some(size) = cli.page_size {
        config.dashboard.page_size = size;
    }

    init_tracing(
        &TracingConfig { debug: cli.debug },
        &config.dashboard_log_file(),
    )?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let dashboard = &config.dashboard;
    let (store, backend_label) = if cli.offline {
        (TabOrderStore::in_memory(), "offline".to_string())
    } else {
        let backend = HttpTabOrderBackend::new(&dashboard.api_url)?;
        let label = backend.base_url().to_string();
        (TabOrderStore::new(Arc::new(backend)), label)
    };

    let mut page_size_options = dashboard.page_size_options.clone();
    if !page_size_options.contains(&dashboard.page_size) {
        page_size_options.push(dashboard.page_size);
        page_size_options.sort_unstable();
    }

    let options = AppOptions {
        session: Some(Session {
            user_id: dashboard.user_id.clone(),
            role: dashboard.role,
        }),
        table: TableOptions {
            page_size: dashboard.page_size,
            page_size_options,
            show_page_size: true,
        },
        backend_label,
    };
    info!(
        user = %dashboard.user_id,
        role = %dashboard.role,
        backend = %options.backend_label,
        "starting dashboard"
    );

    let (tx, rx) = unbounded_channel();
    let app = App::new(options, store, runtime.handle().clone(), tx)
        .context("Failed to build dashboard pages")?;
    terminal::run(app, rx)
}
