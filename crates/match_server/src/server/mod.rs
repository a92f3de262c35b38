//! Server module containing core match server functionality
//!
//! This module provides the main server implementation, connection handling,
//! and the WebSocket gateway that delivers match events to clients.

pub mod config;
pub mod connection;
pub mod core;
pub mod gateway;

pub use config::ServerConfig;
pub use connection::{ConnectionId, ConnectionManager};
pub use core::MatchServer;
pub use gateway::WsGateway;
