//! Model Context Protocol (MCP) server layer
//!
//! Exposes the command catalog and dispatcher to MCP-compatible clients over
//! JSON-RPC 2.0. This layer frames requests and responses; command semantics
//! live in [`crate::dispatch`] and [`crate::store`].
//!
//! Methods handled:
//! - `initialize` / `initialized` - Connection setup
//! - `tools/list` - Advertise the command catalog
//! - `tools/call` - Execute a command through the dispatcher
//! - `shutdown` - Acknowledged with a null result

mod protocol;
mod server;
mod transport;

pub use protocol::*;
pub use server::{McpServer, McpServerBuilder, McpServerConfig};
pub use transport::{MemoryTransport, StdioTransport, Transport};
