//! WebSocket implementation of the match event gateway.
//!
//! Serializes typed match events and hands them to the connection manager.
//! Delivery is best effort: a session transition never stalls because a
//! peer's socket is slow or gone, so failures are logged and swallowed.

use async_trait::async_trait;
use match_core::{ClientId, EventGateway, ServerEvent};
use std::sync::Arc;
use tracing::{error, warn};

use crate::server::ConnectionManager;

pub struct WsGateway {
    connections: Arc<ConnectionManager>,
}

impl WsGateway {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    fn encode(event: &ServerEvent) -> Option<String> {
        match serde_json::to_string(event) {
            Ok(text) => Some(text),
            Err(e) => {
                error!("Failed to encode server event: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl EventGateway for WsGateway {
    async fn send(&self, to: ClientId, event: ServerEvent) {
        let Some(text) = Self::encode(&event) else {
            return;
        };
        if let Err(e) = self.connections.send_to_connection(to, &text).await {
            warn!("Failed to deliver event to {}: {}", to, e);
        }
    }

    async fn broadcast(&self, event: ServerEvent) {
        let Some(text) = Self::encode(&event) else {
            return;
        };
        if let Err(e) = self.connections.broadcast_to_all(&text).await {
            warn!("Failed to broadcast event: {}", e);
        }
    }
}
