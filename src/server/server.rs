use std::error::Error;
use std::sync::Arc;
use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::inference::InferenceEngine;
use super::routes;

/// Builds the HTTP router around an already-loaded engine.
///
/// Request bodies are not size-limited: input length is bounded only by the tokenizer.
pub fn build_router(engine: Arc<InferenceEngine>) -> Router {
    Router::new()
        .route("/generate", post(routes::generate))
        .route("/health", get(routes::health_check))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}

/// API Server for handling generation requests
pub struct ApiServer {
    engine: Arc<InferenceEngine>,
    host: String,
    port: u16,
}

impl ApiServer {
    /// The engine must be fully loaded: the server only exists in the ready state.
    pub fn new(engine: InferenceEngine, host: String, port: u16) -> Self {
        info!("Creating new API server on {}:{}", host, port);
        Self {
            engine: Arc::new(engine),
            host,
            port,
        }
    }

    /// Binds the listener and serves until Ctrl+C or SIGTERM.
    pub async fn start(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        info!("Starting server on {}:{}", self.host, self.port);
        let listener = TcpListener::bind((self.host.as_str(), self.port)).await?;
        self.serve(listener).await
    }

    /// Serves on an existing listener until a shutdown signal arrives.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Box<dyn Error + Send + Sync>> {
        let app = build_router(Arc::clone(&self.engine));

        info!("Server listening on {}", listener.local_addr()?);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
