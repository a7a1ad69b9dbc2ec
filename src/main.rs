// lyricscrape HTTP server
//
// Serves /songs, /song and /getLyrics. Every request launches its own headless
// Chromium, so there is no browser to shut down when the server stops.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use lyricscrape::{AppState, ChromeSessionFactory, build_router, cli, find_config_file, load_yaml_config};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = cli::Args::parse();

    let config_path = find_config_file(args.config.as_deref());
    let mut config = load_yaml_config(config_path.as_deref())?;
    if let Some(path) = &config_path {
        info!("Loaded config from {}", path.display());
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    // Resolve (and if needed download) Chrome before accepting requests
    let factory = ChromeSessionFactory::new(config.browser);
    let chrome = factory
        .executable()
        .await
        .context("No usable Chrome/Chromium executable")?;
    info!("Using browser executable {}", chrome.display());

    let state = AppState::new(factory, config.site);
    let app = build_router(state);

    info!("Listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    Ok(())
}
