//! Presentation layer for toolrelay
//!
//! This crate contains the CLI definition, the console reporter that renders
//! chat progress, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::Cli;
pub use output::console::ConsoleReporter;
