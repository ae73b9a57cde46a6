//! Routes each inbound message.
//!
//! ```text
//!                 inbound message
//!                        │
//!          pending wait for (author, channel)?
//!              │ yes                  │ no
//!              ▼                      ▼
//!   ResolvesConversation     starts with trigger?
//!                               │ no        │ yes
//!                               ▼           ▼
//!                             NoOp     StartsCommand
//!                                     (submitted to pool)
//! ```
//!
//! The order is fixed: a message that answers a waiting command is never
//! also treated as a command, even if its text looks like one.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::oneshot;
use tracing::Instrument;

use crate::domain::conversation::{CommandTrigger, InboundMessage, InvocationOutcome};
use crate::domain::foundation::InvocationId;
use crate::ports::TaskExecutor;

use super::{CommandRunner, PendingRegistry};

/// What the dispatcher did with a message.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The message was not for the bridge.
    NoOp,
    /// The message was handed to a command waiting for a reply.
    ResolvesConversation,
    /// The message started a new command.
    StartsCommand(CommandHandle),
}

impl DispatchOutcome {
    /// Whether the message started a command.
    pub fn started_command(&self) -> bool {
        matches!(self, DispatchOutcome::StartsCommand(_))
    }
}

/// Handle to a submitted command invocation.
#[derive(Debug)]
pub struct CommandHandle {
    id: InvocationId,
    outcome: oneshot::Receiver<InvocationOutcome>,
}

impl CommandHandle {
    /// Identifier of the invocation (also recorded on its tracing span).
    pub fn id(&self) -> InvocationId {
        self.id
    }

    /// Waits for the invocation to end.
    ///
    /// Returns `None` if the task was dropped before finishing (aborted by
    /// executor shutdown).
    pub async fn outcome(self) -> Option<InvocationOutcome> {
        self.outcome.await.ok()
    }
}

/// Inbound message router.
pub struct Dispatcher {
    trigger: CommandTrigger,
    registry: Arc<PendingRegistry>,
    runner: Arc<CommandRunner>,
    executor: Arc<dyn TaskExecutor>,
}

impl Dispatcher {
    /// Creates a dispatcher.
    pub fn new(
        trigger: CommandTrigger,
        registry: Arc<PendingRegistry>,
        runner: Arc<CommandRunner>,
        executor: Arc<dyn TaskExecutor>,
    ) -> Self {
        Self {
            trigger,
            registry,
            runner,
            executor,
        }
    }

    /// Routes one message. Never blocks.
    pub fn dispatch(&self, message: InboundMessage) -> DispatchOutcome {
        let key = message.conversation_key();

        if self.registry.resolve(&key, message.clone()) {
            tracing::debug!(conversation = %key, "Message resolved pending conversation");
            return DispatchOutcome::ResolvesConversation;
        }

        let Some(line) = self.trigger.parse(&message.content) else {
            return DispatchOutcome::NoOp;
        };

        let id = InvocationId::new();
        let span = tracing::info_span!(
            "command",
            invocation_id = %id,
            user = %message.author,
            channel = %message.channel,
        );
        let (tx, rx) = oneshot::channel();
        let runner = self.runner.clone();
        let task = async move {
            let outcome = runner.run(message, line).await;
            let _ = tx.send(outcome);
        }
        .instrument(span)
        .boxed();

        match self.executor.submit(task) {
            Ok(()) => {
                tracing::debug!(invocation_id = %id, conversation = %key, "Command submitted");
                DispatchOutcome::StartsCommand(CommandHandle { id, outcome: rx })
            }
            Err(e) => {
                tracing::warn!(conversation = %key, error = %e, "Dropping command");
                DispatchOutcome::NoOp
            }
        }
    }
}
