//! MCP (Model Context Protocol) tool servers
//!
//! ```text
//! McpToolProvider ── McpTransport ─┬─ Stdio  (child process, newline JSON-RPC)
//!                                  └─ Lambda (one Invoke per JSON-RPC message)
//! ```

pub mod lambda;
pub mod protocol;
pub mod provider;
pub mod stdio;
pub mod transport;

pub use provider::McpToolProvider;
pub use transport::McpTransport;
