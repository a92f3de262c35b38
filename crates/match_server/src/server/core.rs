//! Core match server implementation
//!
//! Contains the main MatchServer struct and its primary functionality
//! including initialization, startup, shutdown, and coordination of the
//! connection layer with the match coordinator.

use crate::server::{ConnectionManager, ServerConfig, WsGateway};
use match_core::{MatchCoordinator, RulesEngine};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::ServerError;

/// Main server that hosts one match and its connections
///
/// The MatchServer orchestrates all server components including:
/// - WebSocket connection management
/// - The match coordinator owning the session state machine
/// - Outbound event delivery through the gateway
/// - Graceful shutdown coordination
pub struct MatchServer {
    /// Resolved runtime configuration
    pub config: ServerConfig,
    /// Connection management system
    pub connection_manager: Arc<ConnectionManager>,
    /// The coordinator owning the hosted match
    pub coordinator: Arc<MatchCoordinator>,
    /// Shutdown coordination signal
    pub shutdown_signal: tokio::sync::watch::Sender<bool>,
}

impl MatchServer {
    /// Create a new match server
    ///
    /// # Arguments
    /// * `config` - Resolved server configuration
    /// * `engine` - The rules engine adjudicating the hosted match
    ///
    /// # Returns
    /// A new MatchServer instance ready for startup
    pub fn new(config: ServerConfig, engine: Box<dyn RulesEngine>) -> Self {
        let (shutdown_signal, _) = tokio::sync::watch::channel(false);

        // Create connection manager
        let connection_manager = Arc::new(ConnectionManager::new());

        // Create the outbound gateway over the connection layer
        let gateway = Arc::new(WsGateway::new(connection_manager.clone()));

        // Create the coordinator that owns the session
        let coordinator = Arc::new(MatchCoordinator::new(engine, config.time, gateway));

        Self {
            config,
            connection_manager,
            coordinator,
            shutdown_signal,
        }
    }

    /// Start the server on the configured address
    ///
    /// This method:
    /// 1. Binds to the configured address
    /// 2. Begins accepting WebSocket connections
    /// 3. Handles graceful shutdown on signal
    ///
    /// # Returns
    /// Result indicating server startup success or failure
    ///
    /// # Errors
    /// Returns `ServerError::Network` if binding fails
    pub async fn start(&self) -> Result<(), ServerError> {
        let mut shutdown_rx = self.shutdown_signal.subscribe();
        let addr = self.config.listen_addr;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Network(format!("Failed to bind to {}: {}", addr, e)))?;

        info!("Match server starting on {}", addr);
        info!(
            "Time control: {}s + {}s main, {}s byoyomi",
            self.config.time.main[0], self.config.time.main[1], self.config.time.byoyomi
        );

        // Accept connections loop
        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            info!("New connection from: {}", addr);
                            self.handle_new_connection(stream, addr).await;
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle a new incoming connection
    ///
    /// # Arguments
    /// * `stream` - TCP stream from the new connection
    /// * `addr` - Socket address of the connecting client
    async fn handle_new_connection(&self, stream: tokio::net::TcpStream, addr: SocketAddr) {
        self.connection_manager
            .handle_new_connection(stream, addr, self.coordinator.clone())
            .await;
    }

    /// Shutdown the server gracefully
    ///
    /// This method:
    /// 1. Signals the accept loop to stop
    /// 2. Closes all active connections
    ///
    /// # Returns
    /// Result indicating shutdown success or any errors encountered
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        info!("Shutting down match server...");

        // Signal shutdown to the accept loop
        let _ = self.shutdown_signal.send(true);

        // Close all connections
        self.connection_manager.shutdown_all().await;

        info!("Match server shutdown complete");
        Ok(())
    }

    /// Get the number of active connections
    pub fn connection_count(&self) -> usize {
        self.connection_manager.connection_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match_core::testing::ScriptedEngine;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_server_creation() {
        let server = MatchServer::new(
            ServerConfig::default(),
            Box::new(ScriptedEngine::default()),
        );

        assert_eq!(server.connection_count(), 0);
        assert_eq!(server.config.time.byoyomi, 30);
    }

    #[tokio::test]
    async fn test_server_startup_shutdown() {
        let server = MatchServer::new(
            ServerConfig::default(),
            Box::new(ScriptedEngine::default()),
        );

        // Test that server can be shut down cleanly
        let shutdown_result = timeout(Duration::from_millis(100), server.shutdown()).await;
        assert!(shutdown_result.is_ok());
    }

    #[tokio::test]
    async fn test_start_returns_after_shutdown_signal() {
        let server = Arc::new(MatchServer::new(
            ServerConfig {
                listen_addr: "127.0.0.1:0".parse().unwrap(),
                ..Default::default()
            },
            Box::new(ScriptedEngine::default()),
        ));

        let running = server.clone();
        let handle = tokio::spawn(async move { running.start().await });

        // Give the accept loop a moment to bind, then stop it.
        tokio::time::sleep(Duration::from_millis(50)).await;
        server.shutdown().await.unwrap();

        let result = timeout(Duration::from_secs(1), handle).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }
}
