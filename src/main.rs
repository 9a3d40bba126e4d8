mod app;
mod config;
mod dashboard;
mod data;
mod model;

use anyhow::{Context, Result};
use std::net::SocketAddr;

use app::AppContext;
use config::{Config, EnvConfig};
use dashboard::server::{self, DashboardState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("🚀 Crypto dashboard starting...");

    // Load configuration
    tracing::info!("Loading configuration...");
    let config = Config::load("config.toml")?;
    let env_config = EnvConfig::load()?;

    tracing::info!(
        "Pairs: {}, window length: {}, history limit: {} days",
        config.pairs.len(),
        config.window.length,
        config.api.limit
    );

    // Fetch, predict, and build every chart up front
    let ctx = AppContext::init(&config, &env_config).await?;
    tracing::info!("✅ Built {} charts", ctx.charts.len());

    // Serve the dashboard until ctrl-c
    let addr: SocketAddr = format!("{}:{}", config.system.bind_addr, config.system.port)
        .parse()
        .context("invalid bind_addr/port configuration")?;

    let state = DashboardState::new(ctx.charts);
    tokio::select! {
        result = server::serve(state, addr) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down...");
        }
    }

    Ok(())
}
