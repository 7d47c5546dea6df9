use crate::config::Config;
use crate::routes;
use anyhow::{Context, Result};
use message_api_handler::MessageHandler;
use message_api_persistence::{seed_messages, SqliteMessageStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

/// Gateway service - wires config, store, handler and HTTP server together
pub struct GatewayService {
    config: Config,
}

impl GatewayService {
    /// Create a new gateway service
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the gateway service until Ctrl+C
    pub async fn run(self) -> Result<()> {
        message_api_logging::init_logging(&self.config.logging.level, self.config.logging.json)?;
        info!("Starting Message API Gateway Service");

        let store = SqliteMessageStore::new(
            &self.config.database.path,
            self.config.database.max_connections,
        )
        .await
        .context("Failed to open message store")?;

        let seed = self.config.seed_messages();
        if !seed.is_empty() {
            seed_messages(&store, &seed)
                .await
                .context("Failed to seed messages")?;
        }

        let handler = MessageHandler::new(Arc::new(store));
        let app = routes::router(handler);

        let addr = self.config.server.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;
        info!("Message API listening on {}", addr);

        // Setup signal handler for graceful shutdown
        let shutdown = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
            }
            info!("Received shutdown signal");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Server error")?;

        info!("Gateway service stopped");
        Ok(())
    }
}
