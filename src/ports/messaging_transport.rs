//! Messaging transport ports - Interfaces to the chat platform.
//!
//! The bridge performs exactly two operations against the platform:
//! sending a message to a channel and opening a private channel with a user.
//! Inbound messages arrive either through a [`MessageSource`] consumed by the
//! bridge's receive loop, or by the platform client calling the dispatcher
//! directly from its own callback.

use async_trait::async_trait;

use crate::domain::conversation::{InboundMessage, OutboundMessage};
use crate::domain::foundation::{ChannelId, UserId};

/// Errors that can occur talking to the messaging platform.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection or protocol failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The platform refused the request.
    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The platform sent something we could not understand.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The transport has been shut down.
    #[error("Transport closed")]
    Closed,
}

impl TransportError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        TransportError::Network(message.into())
    }

    /// Creates an invalid payload error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        TransportError::InvalidPayload(message.into())
    }
}

/// Port for delivering messages to the chat platform.
///
/// Implementations must be safe to call from many command tasks at once.
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    /// Send a message to a channel.
    async fn send_message(
        &self,
        channel: &ChannelId,
        message: OutboundMessage,
    ) -> Result<(), TransportError>;

    /// Open (or reuse) a private channel with a user.
    ///
    /// Returns the identifier of the private channel.
    async fn open_private_channel(&self, user: &UserId) -> Result<ChannelId, TransportError>;
}

/// Port for receiving inbound messages one at a time.
#[async_trait]
pub trait MessageSource: Send {
    /// Receive the next inbound message.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    async fn next_message(&mut self) -> Result<Option<InboundMessage>, TransportError>;
}
