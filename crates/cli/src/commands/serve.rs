use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use futurebattles_core::AppConfig;
use futurebattles_http::{create_router, start_pruner, AppState};
use futurebattles_storage::StorageBackend;

pub(crate) async fn run(
    storage: StorageBackend,
    config: &AppConfig,
    host: &str,
    port: u16,
) -> Result<()> {
    tracing::info!(
        backend = storage.kind(),
        ranking = %config.ranking,
        image_base = %config.images.base_url,
        "starting futurebattles"
    );
    let state = Arc::new(AppState::from_config(Arc::new(storage), config)?);
    let pruner = start_pruner(Arc::clone(&state));

    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pruner.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
