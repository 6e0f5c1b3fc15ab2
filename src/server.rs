//! HTTP server startup and shutdown.

use crate::api::{self, AppState};
use crate::config::ServerConfig;
use crate::error::Result;
use crate::tasks::TaskService;
use crate::templates;
use tokio::net::TcpListener;
use tokio::signal;

/// Build the router for `config`: templates loaded, store opened.
///
/// # Errors
///
/// Returns an error if the templates are invalid or the store cannot be
/// opened.
pub fn build_app(config: &ServerConfig) -> Result<axum::Router> {
    templates::init_templates(config.templates_dir.as_deref())?;
    let store = config.open_store()?;
    tracing::info!(store = %config.store, tasks = store.len()?, "task store ready");
    Ok(api::router(AppState::new(TaskService::new(store))))
}

/// Run the server until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if startup fails or the listener cannot be bound.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let app = build_app(&config)?;
    let address = config.socket_addr()?;
    let listener = TcpListener::bind(address).await?;

    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Completes when SIGINT (Ctrl+C) or, on Unix, SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, initiating graceful shutdown"),
        () = terminate => tracing::info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use tempfile::TempDir;

    #[test]
    #[serial_test::serial]
    fn test_build_app_with_sqlite_store() {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig {
            store: StoreBackend::Sqlite,
            database: Some(dir.path().join("tasks.sqlite3")),
            templates_dir: Some(dir.path().join("no-templates-here")),
            ..ServerConfig::default()
        };
        build_app(&config).unwrap();
        assert!(dir.path().join("tasks.sqlite3").exists());
    }

    #[test]
    #[serial_test::serial]
    fn test_build_app_rejects_broken_templates() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("board.html.tera"), "{% if %}").unwrap();
        let config =
            ServerConfig { templates_dir: Some(dir.path().to_path_buf()), ..ServerConfig::default() };
        assert!(build_app(&config).is_err());
        templates::reset_cache().unwrap();
    }
}
