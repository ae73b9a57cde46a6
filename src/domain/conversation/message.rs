//! Inbound and outbound chat messages as seen by the bridge.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::foundation::{ChannelId, UserId};

use super::ConversationKey;

/// A chat message delivered by the transport.
///
/// The transport provides no reply correlation: each message is an
/// independent event, identified for conversation purposes only by its
/// author and channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Raw message text.
    pub content: String,
    /// Who sent the message.
    pub author: UserId,
    /// Where the message was sent.
    pub channel: ChannelId,
    /// Whether the channel is already private to the author.
    #[serde(default)]
    pub private: bool,
}

impl InboundMessage {
    /// Creates a message posted in a shared channel.
    pub fn new(author: UserId, channel: ChannelId, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author,
            channel,
            private: false,
        }
    }

    /// Marks the message as received in a private channel.
    pub fn in_private_channel(mut self) -> Self {
        self.private = true;
        self
    }

    /// The conversation this message belongs to.
    pub fn conversation_key(&self) -> ConversationKey {
        ConversationKey::new(self.author.clone(), self.channel.clone())
    }
}

/// A message the bridge asks the transport to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Message text.
    pub content: String,
}

impl OutboundMessage {
    /// Creates a plain text message.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Builds the outbound message for a flushed block of text.
///
/// Receives the flushed text and the conversation's current message, so
/// factories can e.g. mention the author.
pub type MessageFactory = Arc<dyn Fn(String, &InboundMessage) -> OutboundMessage + Send + Sync>;

/// Factory producing plain text messages.
pub fn plain_message_factory() -> MessageFactory {
    Arc::new(|content: String, _origin: &InboundMessage| OutboundMessage::plain(content))
}
