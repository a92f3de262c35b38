//! Serializes inbound traffic into session transitions.
//!
//! The coordinator is the only place that reads the wall clock and the only
//! place that locks the session, so every handler below it runs with a
//! consistent timestamp and exclusive state access.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::clock::TimeControl;
use crate::engine::RulesEngine;
use crate::events::{ClientEvent, ServerEvent};
use crate::gateway::EventGateway;
use crate::session::Session;
use crate::types::ClientId;

/// Owns the single [`Session`] and routes decoded events into it.
pub struct MatchCoordinator {
    session: Mutex<Session>,
    gateway: Arc<dyn EventGateway>,
}

impl MatchCoordinator {
    pub fn new(
        engine: Box<dyn RulesEngine>,
        time: TimeControl,
        gateway: Arc<dyn EventGateway>,
    ) -> Self {
        Self {
            session: Mutex::new(Session::new(engine, time)),
            gateway,
        }
    }

    /// Decode one raw message from `sender` and run the transition it asks
    /// for. Undecodable messages earn the sender an error event; a rules
    /// engine fault aborts the game for both players.
    pub async fn dispatch(&self, sender: ClientId, text: &str) {
        let now = Instant::now();

        let event = match ClientEvent::parse(text) {
            Ok(event) => event,
            Err(err) => {
                warn!("rejecting message from {}: {}", sender, err);
                self.gateway
                    .send(
                        sender,
                        ServerEvent::Error {
                            message: err.to_string(),
                        },
                    )
                    .await;
                return;
            }
        };

        let mut session = self.session.lock().await;
        match event {
            ClientEvent::JoinRequest { name, author } => {
                session
                    .handle_join(sender, name, author, self.gateway.as_ref())
                    .await;
            }
            ClientEvent::ReadyConfirm => {
                session.handle_ready(sender, now, self.gateway.as_ref()).await;
            }
            ClientEvent::MoveSubmit(notation) => {
                let result = session
                    .handle_move(sender, &notation, now, self.gateway.as_ref())
                    .await;
                if let Err(err) = result {
                    error!("rules engine fault, aborting the game: {}", err);
                    session.abort(self.gateway.as_ref()).await;
                }
            }
            ClientEvent::ViewQuery => {
                session.handle_view(now, self.gateway.as_ref()).await;
            }
        }
    }

    /// Feed a connection teardown into the session.
    pub async fn client_disconnected(&self, sender: ClientId) {
        let mut session = self.session.lock().await;
        session
            .handle_disconnect(sender, self.gateway.as_ref())
            .await;
    }
}
