//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the bridge to external systems:
//! - `transport` - Messaging platforms (in-memory, queue, console, Discord)
//! - `executor` - Worker pools for command invocations
//! - `framework` - Command-line frameworks (clap)

pub mod executor;
pub mod framework;
pub mod transport;

pub use executor::TokioTaskExecutor;
pub use framework::{ClapCommandFramework, ClapHandler};
pub use transport::{
    inbound_from_gateway, inbound_queue, ConsoleSource, ConsoleTransport, DiscordConfig,
    DiscordRestTransport, InMemoryTransport, InboundSender, MessageAuthor, MessageCreateEvent,
    QueueSource,
};
