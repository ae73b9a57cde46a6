//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the conversation bridge and the outside world. Adapters implement these
//! ports.
//!
//! ## Transport Ports
//!
//! - `MessagingTransport` - Send messages, open private channels
//! - `MessageSource` - Receive inbound messages one at a time
//!
//! ## Execution Ports
//!
//! - `CommandFramework` - Parse and run one command line
//! - `TaskExecutor` - Worker pool that runs command invocations
//! - `Conversation` - Ambient object a running command prints and reads through

mod command_framework;
mod conversation;
mod messaging_transport;
mod task_executor;

pub use command_framework::CommandFramework;
pub use conversation::{ask_parsed, Conversation};
pub use messaging_transport::{MessageSource, MessagingTransport, TransportError};
pub use task_executor::{ExecutorError, TaskExecutor};
