//! # ctxforge - Context-Engineering Command Server
//!
//! A single-process MCP server for building LLM context: sessions group
//! context windows, windows hold ordered elements with a declared token
//! budget, and prompt templates live alongside as reusable parameterized
//! text. Commands arrive over JSON-RPC 2.0 (stdio), are validated against a
//! static catalog, and mutate an in-memory store.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ctxforge_core::mcp::{McpServer, StdioTransport};
//!
//! #[tokio::main]
//! async fn main() -> ctxforge_core::Result<()> {
//!     let server = McpServer::builder().name("ctxforge").build();
//!     server.run(StdioTransport::new()).await
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`store`] - in-memory collections and invariant-preserving mutators
//! - [`catalog`] - the closed set of commands and their input schemas
//! - [`dispatch`] - typed argument validation and the uniform envelope
//! - [`mcp`] - JSON-RPC framing, transports, and the server loop
//!
//! Nothing persists across restarts; entities are created and appended to,
//! never updated in place or deleted.

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod id;
pub mod mcp;
pub mod store;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{CtxforgeError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::Command;
    pub use crate::config::ServerConfig;
    pub use crate::dispatch::{DispatchError, Dispatcher, Reply};
    pub use crate::error::{CtxforgeError, Result};
    pub use crate::id::IdGenerator;
    pub use crate::mcp::{
        ContentBlock, JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpServer, McpServerBuilder,
        McpServerConfig, McpTool, MemoryTransport, RequestId, StdioTransport, Transport,
    };
    pub use crate::store::{
        ContextElement, ContextStore, ContextWindow, ElementRole, PromptTemplate, Session,
        StoreError, StoreStats,
    };
}
