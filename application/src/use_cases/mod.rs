//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod provider_group;
pub mod run_chat;

#[cfg(test)]
pub(crate) mod testing;
