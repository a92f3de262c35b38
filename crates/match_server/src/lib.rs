//! # Match Server - WebSocket Front End
//!
//! The network-facing half of the match coordinator. This crate handles
//! transport concerns only and delegates every game decision to
//! [`match_core`]:
//!
//! * **WebSocket connection management** - Handles client connections and
//!   message routing
//! * **Event gateway** - Serializes typed match events onto client sockets
//! * **Configuration** - TOML file plus command-line overrides
//! * **Graceful shutdown** - Signal handling and connection teardown
//!
//! ## Message Flow
//!
//! 1. A client sends a WebSocket text frame with an `{event, data}` payload
//! 2. The connection manager hands the raw text and the connection identity
//!    to the match coordinator
//! 3. The coordinator validates the payload once and runs the session
//!    transition it asks for
//! 4. Resulting events come back out through the [`server::WsGateway`] to
//!    one client or all of them
//!
//! ## Error Handling
//!
//! Malformed or unknown payloads never close the socket; the sender gets a
//! protocol `error` event and the connection stays usable. Only transport
//! failures tear a connection down.

pub use config::{Args, Config};
pub use error::ServerError;
pub use server::{MatchServer, ServerConfig};

pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod shutdown;
