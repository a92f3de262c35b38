//! Configuration settings structures
//!
//! This module defines all the configuration structures used by the server,
//! including network settings and the time control handed to each match.

use serde::{Deserialize, Serialize};

/// Main configuration structure
///
/// This is the root configuration object that contains all server settings.
/// It can be serialized to/from TOML format for configuration files.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Server-specific settings
    pub server: ServerSettings,
    /// Time control settings for the hosted match
    pub time: TimeSettings,
}

/// Server configuration settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ServerSettings {
    /// Network address to bind the server to
    ///
    /// Format: "IP:PORT" (e.g., "127.0.0.1:8000" for localhost,
    /// "0.0.0.0:8000" for all interfaces)
    pub listen_addr: String,
}

/// Time control settings
///
/// All values are in milliseconds, matching what engine clients expect on
/// the wire. The clocks themselves tick in whole seconds, so sub-second
/// parts are dropped when the match is created.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimeSettings {
    /// Black's main time in milliseconds
    pub btime: u64,

    /// White's main time in milliseconds
    pub wtime: u64,

    /// Byoyomi period in milliseconds
    ///
    /// Granted anew for every move once a player's main time is exhausted.
    /// A player who overdraws it loses on time.
    pub byoyomi: u64,
}

impl Default for Config {
    /// Create a default configuration suitable for development
    ///
    /// This provides sensible defaults that work out of the box
    /// for local development and testing: ten minutes of main time
    /// per side plus a thirty second byoyomi.
    fn default() -> Self {
        Self {
            server: ServerSettings {
                listen_addr: "127.0.0.1:8000".to_string(),
            },
            time: TimeSettings {
                btime: 600_000,
                wtime: 600_000,
                byoyomi: 30_000,
            },
        }
    }
}
