//! Conversation port - What a running command can do with its user.
//!
//! Commands never touch stdio. The bridge hands each invocation a
//! `&mut dyn Conversation` through the command framework, and the command
//! prints and reads replies through it as it would on a terminal.
//!
//! Only the primitives are required; `ask`, `prompt` and `confirm` are built
//! on [`Conversation::read_reply`].

use std::str::FromStr;

use async_trait::async_trait;

use crate::domain::conversation::{
    invalid_value_message, CommandError, Confirmation, InboundMessage, Prompt,
    INVALID_CONFIRMATION,
};
use crate::domain::foundation::ChannelId;

/// Ambient conversation object for one command invocation.
#[async_trait]
pub trait Conversation: Send {
    /// The latest message of this conversation: the command message itself,
    /// or the most recent reply.
    fn message(&self) -> &InboundMessage;

    /// Channel output is currently sent to.
    fn channel(&self) -> &ChannelId;

    /// Whether the conversation has moved to (or started in) a private channel.
    fn is_private(&self) -> bool;

    /// Buffers `text` followed by a line terminator.
    fn echo(&mut self, text: &str);

    /// Buffers `text` as is.
    fn write(&mut self, text: &str);

    /// Sends buffered output now. Blank output is dropped, not sent.
    async fn flush(&mut self) -> Result<(), CommandError>;

    /// Moves the rest of the conversation to a private channel with the user.
    ///
    /// Idempotent. Output buffered so far is flushed to the current channel
    /// first.
    async fn escalate_to_private(&mut self) -> Result<(), CommandError>;

    /// Sends `prompt` and waits for the user's next message in the
    /// conversation's channel. When `hidden`, escalates first.
    ///
    /// Fails with [`CommandError::ReplyTimeout`] if nothing arrives in time.
    async fn read_reply(&mut self, prompt: &str, hidden: bool) -> Result<String, CommandError>;

    /// Asks until the reply is acceptable (non-blank, or blank with a default).
    async fn ask(&mut self, prompt: Prompt) -> Result<String, CommandError> {
        loop {
            let reply = self.read_reply(&prompt.render(), prompt.is_hidden()).await?;
            if let Some(value) = prompt.accept(&reply) {
                return Ok(value);
            }
        }
    }

    /// Asks a plain question.
    async fn prompt(&mut self, text: &str) -> Result<String, CommandError> {
        self.ask(Prompt::new(text)).await
    }

    /// Asks a yes/no question until the answer is understood.
    async fn confirm(&mut self, text: &str, default: Option<bool>) -> Result<bool, CommandError> {
        let confirmation = Confirmation::new(text, default);
        loop {
            let reply = self.read_reply(&confirmation.render(), false).await?;
            match confirmation.accept(&reply) {
                Some(answer) => return Ok(answer),
                None => self.echo(INVALID_CONFIRMATION),
            }
        }
    }
}

/// Asks until the reply parses as `T`, explaining each rejected value.
pub async fn ask_parsed<T>(
    conversation: &mut dyn Conversation,
    prompt: Prompt,
) -> Result<T, CommandError>
where
    T: FromStr,
{
    loop {
        let reply = conversation.ask(prompt.clone()).await?;
        let parsed = reply.trim().parse::<T>().ok();
        match parsed {
            Some(value) => return Ok(value),
            None => conversation.echo(&invalid_value_message(&reply)),
        }
    }
}
