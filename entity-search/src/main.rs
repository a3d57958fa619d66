use anyhow::Result;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use entity_search::config::LogFormat;
use entity_search::http::{router, AppState};
use entity_search::{Dependencies, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let settings = Settings::from_env()?;
    init_tracing(settings.log_format);

    let dependencies = Dependencies::new(&settings).await?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let state = AppState::new(dependencies.client, dependencies.loader, shutdown_tx.clone());

    let listener = TcpListener::bind(settings.bind_addr).await?;
    info!(addr = %settings.bind_addr, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    // The router and every clone of the client are gone once serve returns.
    info!("Search engine connection closed");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// Wait for ctrl-c, then tell running generation jobs to stop.
async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
}
