//! CommandFramework port - Interface to the command-line parser and command tree.
//!
//! The bridge does not parse options or route subcommands itself. It hands
//! the tokenized arguments to a framework together with the conversation,
//! and classifies whatever comes back.

use async_trait::async_trait;

use crate::domain::conversation::CommandError;

use super::Conversation;

/// Port for executing one command line.
#[async_trait]
pub trait CommandFramework: Send + Sync {
    /// Run the command identified by `program` with `args`.
    ///
    /// `conversation` is the ambient object commands print to and read
    /// replies from.
    ///
    /// # Errors
    ///
    /// - [`CommandError::Usage`] for bad arguments (text shown to the user)
    /// - [`CommandError::Exit`] / [`CommandError::Abort`] for intentional stops
    /// - [`CommandError::ReplyTimeout`] when a reply wait expired
    /// - [`CommandError::Fault`] for anything else
    async fn invoke(
        &self,
        program: &str,
        args: Vec<String>,
        conversation: &mut dyn Conversation,
    ) -> Result<(), CommandError>;

    /// Builds the usage error reported when the command line itself could not
    /// be tokenized, rendered the way the framework renders its own errors.
    fn usage_error(&self, program: &str, message: &str) -> CommandError {
        let _ = program;
        CommandError::usage(format!("Error: {}", message))
    }
}
