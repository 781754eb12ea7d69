//! prm-api (Property Review Manager) - review moderation and analytics service
//!
//! Zero-config startup: every setting has a default, a missing config file
//! only logs a warning, and the database is created on first run.

use anyhow::{Context, Result};
use clap::Parser;
use prm_common::approvals::open_approval_store;
use prm_common::config::{
    default_config_path, load_toml_config_or_default, CliOverrides, RootFolderInitializer,
    ServiceConfig,
};
use prm_common::db::{init_database, ReviewRepository};
use prm_api::hostaway::HostawayClient;
use prm_api::{build_router, AppState};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "prm-api", version, about = "Property Review Manager API service")]
struct Args {
    /// Config file (default: ~/.config/prm/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Data folder holding prm.db and review-approvals.json
    #[arg(long, value_name = "PATH")]
    root_folder: Option<PathBuf>,

    /// Bind address
    #[arg(long, env = "PRM_HOST")]
    host: Option<String>,

    /// Listen port
    #[arg(long, env = "PRM_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing starts so that [logging] level applies
    let config_path = args.config.clone().or_else(default_config_path);
    let config_missing = config_path.as_ref().is_some_and(|p| !p.exists());
    let toml_config = load_toml_config_or_default(config_path.as_deref());

    let config = ServiceConfig::resolve(
        CliOverrides {
            root_folder: args.root_folder,
            host: args.host,
            port: args.port,
        },
        &toml_config,
    );

    let default_level = config
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();

    info!(
        "Starting Property Review Manager (prm-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(path) = &config_path {
        if config_missing {
            warn!("Config file {} not found, using defaults", path.display());
        } else {
            info!("Config file: {}", path.display());
        }
    }

    let initializer = RootFolderInitializer::new(config.root_folder.clone());
    initializer.ensure_directory_exists()?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database {}: {}", db_path.display(), e);
            return Err(e.into());
        }
    };

    let reviews = ReviewRepository::new(pool.clone());
    let approvals = open_approval_store(
        config.approval_backend,
        reviews.clone(),
        initializer.approvals_path(),
    )
    .await?;

    let hostaway = HostawayClient::new(config.hostaway.clone(), reviews)
        .context("Failed to build Hostaway client")?;
    if hostaway.is_configured() {
        info!("Hostaway API: {}", config.hostaway.base_url);
    }

    let state = AppState::new(pool, approvals, hostaway);
    let app = build_router(state);

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("prm-api listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
