//! Server lifecycle management
//!
//! Binds the HTTP listener, serves the router, and handles graceful
//! shutdown on SIGINT/SIGTERM.

use anyhow::Result;
use tracing::{error, info};

use hlsproxy_api::create_router;
use hlsproxy_core::bootstrap::Services;
use hlsproxy_core::Config;

pub struct HlsProxyServer {
    config: Config,
    services: Services,
}

impl HlsProxyServer {
    pub const fn new(config: Config, services: Services) -> Self {
        Self { config, services }
    }

    /// Serve until a shutdown signal arrives.
    pub async fn run(self) -> Result<()> {
        let router = create_router(
            self.services.store.clone(),
            self.services.rewriter.clone(),
            self.services.segments.clone(),
        );

        let addr = self.config.http_address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("HTTP server listening on {addr}");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server shut down");
        Ok(())
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT/Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
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
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal"),
        () = terminate => info!("Received SIGTERM signal"),
    }
}
