//! Interactive chat module
//!
//! Provides a line-editor based chat interface over a conversation loop.

mod repl;

pub use repl::ChatRepl;
