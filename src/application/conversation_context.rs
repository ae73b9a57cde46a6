//! Per-invocation conversation state.
//!
//! A `ConversationContext` is created for each accepted command message and
//! owned by the task running that command. It is the concrete
//! [`Conversation`] the command framework hands to commands:
//!
//! - printed text goes into the context's [`OutputBuffer`];
//! - reading a reply registers a wait in the shared [`PendingRegistry`]
//!   under (author, current channel), flushes the prompt, then waits;
//! - hidden replies move the conversation to a private channel first.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::conversation::{
    CommandError, ConversationKey, InboundMessage, MessageFactory, OneShotSignal, OutputBuffer,
};
use crate::domain::foundation::ChannelId;
use crate::ports::{Conversation, MessagingTransport};

use super::PendingRegistry;

/// Collaborators shared by every conversation of a bridge.
#[derive(Clone)]
pub struct ConversationServices {
    /// Waits shared with the dispatcher.
    pub registry: Arc<PendingRegistry>,
    /// Outbound side of the chat platform.
    pub transport: Arc<dyn MessagingTransport>,
    /// Builds outbound messages from flushed text.
    pub message_factory: MessageFactory,
    /// Bound on each reply wait.
    pub reply_timeout: Duration,
}

/// State of one running command's conversation.
pub struct ConversationContext {
    message: InboundMessage,
    channel: ChannelId,
    private: bool,
    buffer: OutputBuffer,
    services: ConversationServices,
}

impl ConversationContext {
    /// Creates the context for the command carried by `message`.
    pub fn new(message: InboundMessage, services: ConversationServices) -> Self {
        Self {
            channel: message.channel.clone(),
            private: message.private,
            message,
            buffer: OutputBuffer::new(),
            services,
        }
    }

    /// Text printed but not yet flushed.
    pub fn buffered(&self) -> &str {
        self.buffer.as_str()
    }

    fn key(&self) -> ConversationKey {
        ConversationKey::new(self.message.author.clone(), self.channel.clone())
    }

    /// Waits for the signal, settling any race with the registry.
    async fn await_reply(
        &self,
        key: &ConversationKey,
        signal: &Arc<OneShotSignal>,
    ) -> Result<InboundMessage, CommandError> {
        let timeout = self.services.reply_timeout;

        if signal.wait(timeout).await {
            if let Some(reply) = signal.result() {
                return Ok(reply);
            }
        }

        if self.services.registry.discard(key, signal) {
            tracing::debug!(conversation = %key, ?timeout, "Reply wait timed out");
            return Err(CommandError::ReplyTimeout { timeout });
        }

        // The entry was taken by a resolving message right at the deadline,
        // or replaced by a newer wait. Only the former carries a reply.
        signal
            .result()
            .ok_or(CommandError::ReplyTimeout { timeout })
    }
}

#[async_trait]
impl Conversation for ConversationContext {
    fn message(&self) -> &InboundMessage {
        &self.message
    }

    fn channel(&self) -> &ChannelId {
        &self.channel
    }

    fn is_private(&self) -> bool {
        self.private
    }

    fn echo(&mut self, text: &str) {
        self.buffer.push_line(text);
    }

    fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    async fn flush(&mut self) -> Result<(), CommandError> {
        let Some(text) = self.buffer.take_flushable() else {
            return Ok(());
        };
        let outbound = (self.services.message_factory)(text, &self.message);
        self.services
            .transport
            .send_message(&self.channel, outbound)
            .await
            .map_err(CommandError::fault)
    }

    async fn escalate_to_private(&mut self) -> Result<(), CommandError> {
        if self.private {
            return Ok(());
        }

        self.flush().await?;
        let channel = self
            .services
            .transport
            .open_private_channel(&self.message.author)
            .await
            .map_err(CommandError::fault)?;

        tracing::debug!(from = %self.channel, to = %channel, "Moved conversation to private channel");
        self.channel = channel;
        self.private = true;
        Ok(())
    }

    async fn read_reply(&mut self, prompt: &str, hidden: bool) -> Result<String, CommandError> {
        if hidden {
            self.escalate_to_private().await?;
        }

        // Register before the prompt goes out so a fast reply cannot slip
        // past as an unrelated message.
        let wait = RegisteredWait::new(self.services.registry.clone(), self.key());

        self.buffer.push_str(prompt);
        self.flush().await?;

        let reply = self.await_reply(&wait.key, &wait.signal).await?;
        let content = reply.content.clone();
        self.message = reply;
        Ok(content)
    }
}

/// A registered reply wait, discarded when dropped.
///
/// Covers every way out of `read_reply`, including the reading task being
/// aborted mid-wait. Discarding is compare-and-remove, so dropping after the
/// wait was resolved or already discarded is a no-op.
struct RegisteredWait {
    registry: Arc<PendingRegistry>,
    key: ConversationKey,
    signal: Arc<OneShotSignal>,
}

impl RegisteredWait {
    fn new(registry: Arc<PendingRegistry>, key: ConversationKey) -> Self {
        let signal = registry.register(key.clone());
        Self {
            registry,
            key,
            signal,
        }
    }
}

impl Drop for RegisteredWait {
    fn drop(&mut self) {
        self.registry.discard(&self.key, &self.signal);
    }
}
