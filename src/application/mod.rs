//! Application layer - routing, invocation and reply correlation.
//!
//! This layer orchestrates the conversation domain and coordinates between
//! ports. The [`Dispatcher`] decides what each inbound message is, the
//! [`CommandRunner`] owns one invocation from start to finish, and the
//! [`PendingRegistry`] hands replies to the commands waiting for them.

mod bridge;
mod command_runner;
mod conversation_context;
mod dispatcher;
mod pending_registry;

pub use bridge::{BridgeError, ConversationBridge, ConversationBridgeBuilder};
pub use command_runner::CommandRunner;
pub use conversation_context::{ConversationContext, ConversationServices};
pub use dispatcher::{CommandHandle, DispatchOutcome, Dispatcher};
pub use pending_registry::PendingRegistry;
