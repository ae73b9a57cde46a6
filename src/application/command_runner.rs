//! Runs one command invocation from start to finish.
//!
//! The runner is the single boundary where every way a command can end is
//! absorbed:
//!
//! | Result                | User sees          | Operators see |
//! |-----------------------|--------------------|---------------|
//! | success               | buffered output    | info          |
//! | usage error           | output + usage     | info          |
//! | early exit / abort    | buffered output    | info          |
//! | reply timeout         | buffered output    | debug         |
//! | fault / panic         | buffered output    | error         |
//!
//! Buffered output is flushed exactly once when the invocation ends,
//! whichever row applies.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::domain::conversation::{CommandError, CommandLine, InboundMessage, InvocationOutcome};
use crate::ports::{CommandFramework, Conversation};

use super::{ConversationContext, ConversationServices};

/// Executes recognized command lines against the command framework.
pub struct CommandRunner {
    framework: Arc<dyn CommandFramework>,
    services: ConversationServices,
}

impl CommandRunner {
    /// Creates a runner.
    pub fn new(framework: Arc<dyn CommandFramework>, services: ConversationServices) -> Self {
        Self {
            framework,
            services,
        }
    }

    /// Runs the command carried by `message` and reports how it ended.
    ///
    /// Never fails and never panics because of the command: every error is
    /// classified, logged, and turned into an [`InvocationOutcome`].
    pub async fn run(&self, message: InboundMessage, line: CommandLine) -> InvocationOutcome {
        let mut context = ConversationContext::new(message, self.services.clone());
        let (program, args) = line.into_parts();

        let result = match args {
            Ok(args) => self.invoke_guarded(&program, args, &mut context).await,
            Err(e) => Err(self.framework.usage_error(&program, &e.to_string())),
        };
        let outcome = InvocationOutcome::of(&result);

        match result {
            Ok(()) | Err(CommandError::Exit) | Err(CommandError::Abort) => {}
            Err(CommandError::Usage(text)) => {
                context.write(&text);
                if !text.ends_with('\n') {
                    context.write("\n");
                }
            }
            Err(CommandError::ReplyTimeout { timeout }) => {
                tracing::debug!(?timeout, "Command ended waiting for a reply");
            }
            Err(CommandError::Fault(e)) => {
                tracing::error!(error = %e, "Unhandled error in command handler");
            }
        }

        if let Err(e) = context.flush().await {
            tracing::warn!(error = %e, "Failed to flush command output");
        }

        tracing::info!(%outcome, "Command finished");
        outcome
    }

    /// Invokes the framework, converting a panic into a fault.
    async fn invoke_guarded(
        &self,
        program: &str,
        args: Vec<String>,
        context: &mut ConversationContext,
    ) -> Result<(), CommandError> {
        let invocation = self.framework.invoke(program, args, context);
        match AssertUnwindSafe(invocation).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(CommandError::fault(format!(
                "command panicked: {}",
                panic_message(panic.as_ref())
            ))),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
