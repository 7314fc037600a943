use anyhow::Result;
use clap::Parser;
use flashdeck_server::config::ServerConfig;
use flashdeck_service::LocalService;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();
    let backend = config.completion_backend()?;
    if backend.name() == "offline" {
        warn!("no API key configured; generation serves offline decks");
    } else {
        info!(model = %config.model, "generation via {}", config.completions_url);
    }

    let store = config.open_store()?;
    info!(db = %config.db.display(), "card database opened");

    let addr = config.addr();
    let listener = TcpListener::bind(addr).await?;
    info!("flashdeck-server listening on http://{addr}");

    flashdeck_server::serve(listener, LocalService::new(store, backend)).await?;
    Ok(())
}
