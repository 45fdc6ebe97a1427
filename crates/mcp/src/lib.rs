//! Vanguide MCP (Model Context Protocol) server
//!
//! Exposes the guided van-configuration flow and the ops cockpit as MCP tools so
//! agents can drive a customer session without the HTTP surface.
//!
//! ## Architecture
//!
//! - `VanguideMcpServer`: tool router over one in-memory [`GuidedSessionService`]
//! - `tools`: tool names grouped by category
//!
//! ## Example Usage
//!
//! ```no_run
//! use vanguide_core::GuidedSessionService;
//! use vanguide_mcp::VanguideMcpServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     VanguideMcpServer::new(GuidedSessionService::default()).run_stdio().await
//! }
//! ```
//!
//! [`GuidedSessionService`]: vanguide_core::GuidedSessionService

mod server;
mod tools;

pub use server::{
    AdvanceSessionInput, FixIssueInput, FixOutcome, OpsBoardInput, SessionInput, SessionIssuesInput,
    SessionProfileInput, VanguideMcpServer,
};
pub use tools::*;

use rmcp::model::ErrorCode;
use rmcp::ErrorData;
use thiserror::Error;
use vanguide_core::DomainError;

/// Errors specific to MCP tool calls
#[derive(Error, Debug)]
pub enum McpError {
    #[error("domain error: {0}")]
    Domain(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// Convert to JSON-RPC error code
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::NotFound(_) => -32602,   // Invalid params (resource not found)
            McpError::Validation(_) => -32602, // Invalid params
            McpError::Domain(_) => -32600,     // Invalid request
            McpError::Internal(_) => -32603,   // Internal error
        }
    }
}

impl From<DomainError> for McpError {
    fn from(error: DomainError) -> Self {
        if error.is_not_found() {
            McpError::NotFound(error.to_string())
        } else {
            McpError::Domain(error.to_string())
        }
    }
}

impl From<McpError> for ErrorData {
    fn from(error: McpError) -> Self {
        ErrorData::new(ErrorCode(error.error_code()), error.to_string(), None)
    }
}

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;
