//! Messaging transport adapters.
//!
//! Adapters implement the messaging transport and message source ports
//! for different environments:
//!
//! - `InMemoryTransport` - Recording transport for tests and embedding
//! - `QueueSource` - Channel-backed source fed from platform callbacks
//! - `ConsoleTransport` / `ConsoleSource` - Terminal stand-in for a chat
//! - `DiscordRestTransport` - Discord HTTP API

mod console;
mod discord;
mod in_memory;
mod queue;

pub use console::{ConsoleSource, ConsoleTransport};
pub use discord::{
    inbound_from_gateway, DiscordConfig, DiscordRestTransport, MessageAuthor, MessageCreateEvent,
};
pub use in_memory::InMemoryTransport;
pub use queue::{inbound_queue, InboundSender, QueueSource};
