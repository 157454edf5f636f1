//! Tool domain module
//!
//! This module defines how the agent sees tools exposed by external tool
//! servers: what a tool looks like ([`ToolDescriptor`]), what invoking it
//! yields ([`ToolResult`]), and the capability every server connection
//! offers ([`ToolProvider`]).
//!
//! ```text
//! ┌────────────────┐   list_tools()   ┌────────────────┐
//! │ ToolProvider   │─────────────────▶│ ToolDescriptor │──▶ toolSpec (model)
//! │ (stdio/lambda) │                  └────────────────┘
//! │                │   invoke_tool()  ┌────────────────┐
//! │                │─────────────────▶│ ToolResult     │──▶ toolResult block
//! └────────────────┘                  └────────────────┘
//! ```
//!
//! The domain layer holds no I/O. Concrete providers live in the
//! infrastructure crate, the aggregation logic in the application crate.

pub mod descriptor;
pub mod provider;
pub mod result;

pub use descriptor::{ToolDescriptor, render_tool_specs};
pub use provider::{ConnectionError, ConnectionState, ToolProvider};
pub use result::{ToolResult, ToolResultContent, ToolStatus};
