//! Match Server - Main Entry Point
//!
//! A WebSocket match server that pairs two engine clients, runs the
//! readiness handshake, and relays moves under byoyomi time control with
//! graceful shutdown handling.

use anyhow::Result;
use clap::Parser;
use match_core::testing::ScriptedEngine;
use match_core::TimeControl;
use tracing::{error, info, warn};

use match_server::{
    config::{self, Args, Config},
    logging,
    server::{MatchServer, ServerConfig},
    shutdown,
};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging system
    if let Err(e) = logging::setup_logging(&args) {
        eprintln!("Failed to initialize logging: {}", e);
        return Err(anyhow::anyhow!("Failed to initialize logging: {}", e));
    }

    // Log startup information
    info!("Starting match server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = config::load_config(&args)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    info!("Configuration loaded from: {}", args.config.display());

    // Create server configuration
    let server_config = create_server_config(&config, &args)?;
    server_config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    // No real rules engine is linked in yet; the scripted engine accepts a
    // small fixed move vocabulary, which is enough to exercise the full
    // network path.
    warn!("Using the built-in scripted rules engine");
    let server = MatchServer::new(server_config.clone(), Box::new(ScriptedEngine::default()));

    // Setup shutdown handler
    let shutdown_receiver = shutdown::setup_shutdown_handler().await;

    // Log final server configuration
    log_server_configuration(&server_config);

    // Run the server and wait for shutdown
    tokio::select! {
        result = server.start() => {
            match result {
                Ok(_) => info!("Server stopped normally"),
                Err(e) => {
                    error!("Server error: {}", e);
                    return Err(e.into());
                }
            }
        }
        _ = shutdown_receiver => {
            info!("Shutdown signal received");
            if let Err(e) = server.shutdown().await {
                error!("Error during shutdown: {}", e);
            }
        }
    }

    Ok(())
}

/// Create server configuration from loaded config and CLI arguments
fn create_server_config(config: &Config, args: &Args) -> Result<ServerConfig> {
    let listen_addr = args
        .listen
        .as_deref()
        .unwrap_or(&config.server.listen_addr)
        .parse()
        .map_err(|e| anyhow::anyhow!("Failed to parse listen address: {}", e))?;

    // Configured milliseconds become whole clock seconds.
    let time = TimeControl::from_millis(config.time.btime, config.time.wtime, config.time.byoyomi);

    Ok(ServerConfig { listen_addr, time })
}

/// Log the final server configuration
fn log_server_configuration(config: &ServerConfig) {
    info!("Server configuration:");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Black main time: {}s", config.time.main[0]);
    info!("  White main time: {}s", config.time.main[1]);
    info!("  Byoyomi: {}s", config.time.byoyomi);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_server_config() {
        let config = Config::default();
        let args = Args::default();

        let server_config = create_server_config(&config, &args).unwrap();
        assert_eq!(server_config.listen_addr.to_string(), "127.0.0.1:8000");
        assert_eq!(server_config.time.main, [600, 600]);
        assert_eq!(server_config.time.byoyomi, 30);
    }

    #[test]
    fn test_create_server_config_with_overrides() {
        let config = Config::default();
        let mut args = Args::default();
        args.listen = Some("0.0.0.0:9090".to_string());

        let server_config = create_server_config(&config, &args).unwrap();
        assert_eq!(server_config.listen_addr.to_string(), "0.0.0.0:9090");
    }

    #[test]
    fn test_create_server_config_truncates_sub_second_millis() {
        let mut config = Config::default();
        config.time.btime = 90_500;
        config.time.byoyomi = 5_999;
        let args = Args::default();

        let server_config = create_server_config(&config, &args).unwrap();
        assert_eq!(server_config.time.main[0], 90);
        assert_eq!(server_config.time.byoyomi, 5);
    }

    #[test]
    fn test_create_server_config_rejects_bad_address() {
        let mut config = Config::default();
        config.server.listen_addr = "not an address".to_string();
        let args = Args::default();

        assert!(create_server_config(&config, &args).is_err());
    }
}
