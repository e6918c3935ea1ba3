use crate::core::settings::Settings;
use crate::core::store::TicketStore;
use crate::refresher::Refresher;
use crate::scheduler;
use crate::server::{self, AppState};
use anyhow::{Context, Result};
use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub async fn run(config: Option<&Path>) -> Result<()> {
    let settings = Settings::load(config)?;
    settings.validate()?;

    let store = TicketStore::new();
    let refresher = Arc::new(Refresher::new(&settings, store.clone())?);

    // one synchronous cycle before accepting requests, so the first page
    // load already has artifacts to serve
    let outcome = refresher.refresh().await;
    if !outcome.success {
        tracing::warn!(message = %outcome.message, "Initial refresh fell back");
    }

    let token = CancellationToken::new();
    let scheduler_task = scheduler::spawn(
        Arc::clone(&refresher),
        Duration::from_secs(settings.source.refresh_interval_secs),
        token.clone(),
    );

    let app = server::create_routes(AppState::new(refresher, store), &settings.storage.data_dir);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(addr = %addr, "Ticket mirror listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    token.cancel();
    scheduler_task.await.context("Scheduler task failed")?;
    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await
}

/// Resolves once a shutdown signal arrives. A failed handler registration
/// means no signal can ever be delivered, so the future parks instead of
/// resolving and the server runs until the process is killed.
async fn wait_for_shutdown(signal: impl Future<Output = io::Result<()>>) {
    match signal.await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
