//! Domain layer containing the conversation model.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (identifiers, errors)
//! - `conversation` - Messages, keys, output buffering, prompts, reply signals

pub mod conversation;
pub mod foundation;
