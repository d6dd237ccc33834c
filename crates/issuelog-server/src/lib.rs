//! HTTP server for issuelog.
//!
//! This crate binds [`issuelog::resource::IssueResource`] to the
//! `/api/issues/{project}` route with axum. Every response is `200 OK` with
//! a JSON body; clients distinguish success from failure by the body shape.
//!
//! # Architecture
//!
//! - [`config`] resolves defaults, an optional YAML file, and CLI/env overrides
//! - [`routes`] builds the [`axum::Router`] and decodes request bodies
//! - [`serve`] binds the listener and runs until Ctrl-C or SIGTERM

pub mod config;
pub mod error;
pub mod routes;

pub use config::{ServerArgs, ServerConfig};
pub use error::{Error, Result};
pub use routes::router;

use issuelog::resource::IssueResource;
use issuelog::storage::create_storage;
use tokio::net::TcpListener;

/// Open the configured store and wrap it in a resource.
///
/// # Errors
///
/// Returns an error if the storage backend is unknown or its data file
/// cannot be read.
pub async fn build_resource(config: &ServerConfig) -> Result<IssueResource> {
    let backend = config.storage.to_backend()?;
    tracing::debug!(?backend, "Opening storage");
    let storage = create_storage(backend).await?;
    Ok(IssueResource::new(storage))
}

/// Run the server until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if storage cannot be opened, the address cannot be
/// bound, or the server fails while running.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let resource = build_resource(&config).await?;

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| Error::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(resource))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves when Ctrl-C or (on Unix) SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
