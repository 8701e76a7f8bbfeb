//! Gateway server

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, info, warn};

use super::auth::ResolvedGate;
use super::router::{AppState, create_router};
use crate::config::Config;
use crate::registry::{WidgetProvider, WidgetRegistry};
use crate::widget::WidgetKind;
use crate::{Error, Result};

/// Widget gateway server
pub struct Gateway {
    /// Configuration
    config: Config,
    /// Registered widgets
    registry: WidgetRegistry,
}

impl Gateway {
    /// Create a new gateway with an empty registry
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: WidgetRegistry::new(),
        }
    }

    /// Register a widget backed by a custom provider
    pub fn register(
        &mut self,
        name: impl Into<String>,
        kind: WidgetKind,
        description: impl Into<String>,
        provider: Arc<dyn WidgetProvider>,
    ) {
        self.registry.register(name, kind, description, provider);
    }

    /// Load widget definitions from the configured directories.
    ///
    /// A missing directory is skipped rather than failing startup.
    /// Returns the total number of widgets loaded.
    pub async fn load_widgets(&mut self) -> Result<usize> {
        let mut total = 0;
        for dir in &self.config.widgets.directories {
            match self.registry.load_directory(dir).await {
                Ok(count) => {
                    total += count;
                    debug!(directory = %dir, count, "Loaded widget directory");
                }
                Err(e) => {
                    debug!(directory = %dir, error = %e, "Skipped widget directory");
                }
            }
        }
        Ok(total)
    }

    /// Run the gateway
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .host
                .parse()
                .map_err(|e| Error::Config(format!("Invalid host: {e}")))?,
            self.config.server.port,
        );

        let gate = Arc::new(ResolvedGate::from_config(&self.config.auth));
        let gate_enabled = gate.api_key.is_some();
        let state = Arc::new(AppState {
            registry: self.registry,
            gate,
        });

        let app = create_router(Arc::clone(&state));

        let listener = TcpListener::bind(addr).await?;

        info!("============================================================");
        info!("WIDGET GATEWAY v{}", env!("CARGO_PKG_VERSION"));
        info!("============================================================");
        info!(host = %self.config.server.host, port = %self.config.server.port, "Listening");
        info!(widgets = state.registry.len(), "Widgets registered");

        if gate_enabled {
            info!("AUTHORIZATION GATE enabled (Basic API key)");
        } else {
            warn!("AUTHORIZATION GATE disabled - widget routes are open to all requests");
        }

        info!("Widget feeds:");
        for name in state.registry.names() {
            info!(
                "  /widgets/{}  (format=1 XML, format=2 JSON)",
                name
            );
        }
        info!("============================================================");

        // Run server with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        info!("Gateway shutdown complete");
        Ok(())
    }
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
