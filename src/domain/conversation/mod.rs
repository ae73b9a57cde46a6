//! Conversation domain module.
//!
//! Pure building blocks of a chat conversation with a running command:
//! who is talking where (`ConversationKey`), what they said
//! (`InboundMessage`), what the command has printed so far (`OutputBuffer`),
//! how a reply is handed over (`OneShotSignal`), how prompts look
//! (`Prompt`, `Confirmation`) and how a command ends (`CommandError`).

mod command_line;
mod errors;
mod key;
mod message;
mod output_buffer;
mod prompt;
mod signal;

pub use command_line::{tokenize, CommandLine, CommandTrigger, TokenizeError};
pub use errors::{CommandError, FaultSource, InvocationOutcome};
pub use key::ConversationKey;
pub use message::{plain_message_factory, InboundMessage, MessageFactory, OutboundMessage};
pub use output_buffer::OutputBuffer;
pub use prompt::{invalid_value_message, Confirmation, Prompt, INVALID_CONFIRMATION};
pub use signal::OneShotSignal;
