//! Vanguide MCP Server Binary
//!
//! ## Usage
//!
//! ```bash
//! # Serve the guided flow over stdio
//! vanguide-mcp
//!
//! # Quieter logs, still on stderr
//! VANGUIDE_LOGGING_LEVEL=warn vanguide-mcp
//! ```

use anyhow::Result;
use vanguide_core::config::{AppConfig, LoadOptions};
use vanguide_core::GuidedSessionService;
use vanguide_mcp::VanguideMcpServer;

/// Logs go to stderr; stdout carries the protocol.
fn init_logging(config: &AppConfig) {
    use tracing::Level;
    use vanguide_core::config::LogFormat::*;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(log_level);

    match config.logging.format {
        Compact => builder.compact().init(),
        Pretty => builder.pretty().init(),
        Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    tracing::info!(
        event_name = "system.mcp.starting",
        catalog = "seeded",
        "starting Vanguide MCP server"
    );

    VanguideMcpServer::new(GuidedSessionService::default()).run_stdio().await
}
