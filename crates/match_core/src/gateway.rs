//! The messaging boundary the session emits through.

use async_trait::async_trait;

use crate::events::ServerEvent;
use crate::types::ClientId;

/// Outbound event delivery to one client or to everyone.
///
/// Delivery is fire-and-forget: implementations log failures and never
/// surface them to the state machine, so a dead observer connection cannot
/// perturb a running game.
#[async_trait]
pub trait EventGateway: Send + Sync {
    /// Deliver an event to one client.
    async fn send(&self, to: ClientId, event: ServerEvent);

    /// Deliver an event to every connected client, players and observers.
    async fn broadcast(&self, event: ServerEvent);
}
