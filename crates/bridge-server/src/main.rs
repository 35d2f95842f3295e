use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use application::TagManager;
use bridge_server::{api, state::AppState};
use domain::sensor::TemperatureUnit;
use infrastructure::{BridgeConfig, BroadcastEventPublisher, WirelessTagClient};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration directory
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// API port override
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,bridge_server=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    dotenv::dotenv().ok();

    info!("Tag bridge starting...");
    let config = BridgeConfig::load(&args.config_dir)?;
    let unit = TemperatureUnit::from_flag(config.temperature_unit);
    info!(unit = unit.as_str(), "Loaded configuration");

    // 1. Event channel toward the host integration (SSE subscribers)
    let events = BroadcastEventPublisher::new(256);

    // 2. Cloud tag manager client
    let client = Arc::new(WirelessTagClient::new(
        &config.cloud.base_url,
        &config.cloud.token,
        &config.cloud.mac,
        Duration::from_secs(config.cloud.timeout_secs),
    )?);

    // 3. Tag manager: one actor per discovered tag
    let manager = Arc::new(TagManager::new(
        client,
        Arc::new(events.clone()),
        unit,
        Duration::from_secs(config.freshness_tick_secs),
    ));

    match manager.sync_tags().await {
        Ok(count) => info!(count, total = manager.tag_count(), "Tag discovery complete"),
        Err(e) => warn!("Initial tag discovery failed: {}", e),
    }

    // 4. Start API server
    let state = Arc::new(AppState::new(manager.clone(), events));
    let app = api::create_router(state);
    let port = args.port.unwrap_or(config.server.port);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
