//! Server configuration management
//!
//! Defines configuration structures and defaults for the match server.

use match_core::TimeControl;
use std::net::SocketAddr;

/// Configuration settings for the match server
///
/// Contains the resolved runtime parameters: where to listen and the time
/// control handed to the hosted match.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Network address and port to bind the server to
    pub listen_addr: SocketAddr,

    /// Time control applied to both players, in whole seconds
    pub time: TimeControl,
}

impl ServerConfig {
    /// Create a new server configuration with custom values
    ///
    /// # Arguments
    /// * `listen_addr` - Address to bind the server to
    /// * `time` - Time control for the hosted match
    pub fn new(listen_addr: SocketAddr, time: TimeControl) -> Self {
        Self { listen_addr, time }
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// Result indicating whether the configuration is valid
    ///
    /// # Errors
    /// Returns error messages for invalid configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.time.main.iter().all(|&m| m == 0) && self.time.byoyomi == 0 {
            return Err("time control must allow at least one second of thinking".to_string());
        }

        Ok(())
    }
}

impl Default for ServerConfig {
    /// Create a server configuration with sensible defaults
    ///
    /// Default values:
    /// - Listen address: 127.0.0.1:8000
    /// - Main time: 600 seconds per side
    /// - Byoyomi: 30 seconds
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8000".parse().unwrap(),
            time: TimeControl {
                main: [600, 600],
                byoyomi: 30,
            },
        }
    }
}
