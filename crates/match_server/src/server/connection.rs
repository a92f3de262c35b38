//! Connection management system
//!
//! Handles WebSocket connections, their identities, and message routing
//! into the match coordinator.

use dashmap::DashMap;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use match_core::{ClientId, MatchCoordinator};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};
use tracing::{error, info, warn};

use crate::error::ServerError;

/// Type alias for WebSocket stream
type WsStream = WebSocketStream<TcpStream>;
/// Type alias for WebSocket sink (outgoing messages)
pub type WsSink = SplitSink<WsStream, Message>;
/// Type alias for WebSocket receiver (incoming messages)
type WsReceiver = SplitStream<WsStream>;

/// Unique identifier for a connection
pub type ConnectionId = ClientId;

/// Manages WebSocket connections
///
/// The ConnectionManager handles:
/// - WebSocket handshake and connection establishment
/// - Message routing into the match coordinator
/// - Connection cleanup on disconnect
/// - Broadcasting capabilities
pub struct ConnectionManager {
    /// Active WebSocket connections mapped by connection ID
    connections: Arc<DashMap<ConnectionId, WsSink>>,
}

impl ConnectionManager {
    /// Create a new connection manager
    pub fn new() -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
        }
    }

    /// Handle a new incoming TCP connection
    ///
    /// This method:
    /// 1. Performs WebSocket handshake
    /// 2. Creates a unique connection ID
    /// 3. Splits the connection for bidirectional communication
    /// 4. Spawns a task to handle incoming messages
    ///
    /// # Arguments
    /// * `stream` - TCP stream from the client
    /// * `addr` - Client's socket address
    /// * `coordinator` - The match coordinator fed by this connection
    pub async fn handle_new_connection(
        &self,
        stream: TcpStream,
        addr: SocketAddr,
        coordinator: Arc<MatchCoordinator>,
    ) {
        // Perform WebSocket handshake
        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                error!("WebSocket handshake failed for {}: {}", addr, e);
                return;
            }
        };

        let (ws_sink, ws_receiver) = ws_stream.split();
        let connection_id = ConnectionId::new();

        // Store the connection
        self.connections.insert(connection_id, ws_sink);
        info!("Connection {} established from {}", connection_id, addr);

        // Spawn task to handle messages from this connection
        let connections = self.connections.clone();
        tokio::spawn(async move {
            Self::handle_connection_messages(
                connection_id,
                ws_receiver,
                coordinator.clone(),
                connections.clone(),
            )
            .await;

            // Clean up on disconnect, then let the match react
            connections.remove(&connection_id);
            coordinator.client_disconnected(connection_id).await;
            info!("Connection {} from {} closed", connection_id, addr);
        });
    }

    /// Handle incoming messages from a specific connection
    ///
    /// Every text frame is handed to the coordinator as-is; payload
    /// validation happens there, and validation failures are reported to
    /// the sender as protocol events rather than closing the socket.
    async fn handle_connection_messages(
        connection_id: ConnectionId,
        mut ws_receiver: WsReceiver,
        coordinator: Arc<MatchCoordinator>,
        connections: Arc<DashMap<ConnectionId, WsSink>>,
    ) {
        while let Some(msg) = ws_receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    coordinator.dispatch(connection_id, text.as_str()).await;
                }
                Ok(Message::Close(_)) => {
                    info!("Connection {} requested close", connection_id);
                    break;
                }
                Ok(Message::Ping(data)) => {
                    // Respond to ping with pong
                    if let Some(mut sink) = connections.get_mut(&connection_id) {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                }
                Ok(Message::Pong(_)) => {
                    // Pong received, connection is alive
                }
                Err(e) => {
                    error!("WebSocket error for connection {}: {}", connection_id, e);
                    break;
                }
                _ => {
                    warn!("Received unsupported message type from {}", connection_id);
                }
            }
        }
    }

    /// Send a message to a specific connection
    ///
    /// Sending to an unknown connection is a no-op; the peer may have
    /// disconnected between the event being produced and delivered.
    ///
    /// # Arguments
    /// * `connection_id` - Target connection ID
    /// * `message` - Message text to send
    ///
    /// # Returns
    /// Result indicating success or failure
    pub async fn send_to_connection(
        &self,
        connection_id: ConnectionId,
        message: &str,
    ) -> Result<(), ServerError> {
        if let Some(mut sink) = self.connections.get_mut(&connection_id) {
            sink.send(Message::Text(message.into()))
                .await
                .map_err(|e| ServerError::Network(format!("Failed to send message: {}", e)))?;
        }
        Ok(())
    }

    /// Broadcast a message to all connected clients
    ///
    /// # Arguments
    /// * `message` - Message text to broadcast
    ///
    /// # Returns
    /// Result indicating success or failure
    pub async fn broadcast_to_all(&self, message: &str) -> Result<(), ServerError> {
        let msg = Message::Text(message.into());

        for mut entry in self.connections.iter_mut() {
            let _ = entry.value_mut().send(msg.clone()).await;
        }

        Ok(())
    }

    /// Get the number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Close all connections gracefully
    pub async fn shutdown_all(&self) {
        for mut entry in self.connections.iter_mut() {
            let _ = entry.value_mut().send(Message::Close(None)).await;
        }
        self.connections.clear();
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
