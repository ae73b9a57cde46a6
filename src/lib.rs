//! Parley - Terminal-style commands over chat conversations
//!
//! This crate bridges an asynchronous chat message stream with a
//! command-line command model: a message starting with the configured
//! trigger runs a command, and the command's prompts are answered by the
//! same user's next messages in the same channel.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
