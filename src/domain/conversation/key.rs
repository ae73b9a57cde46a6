//! Conversation key value object.

use std::fmt;

use crate::domain::foundation::{ChannelId, UserId};

/// Identifies a conversation: one user in one channel.
///
/// At most one reply wait is outstanding per key at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    user: UserId,
    channel: ChannelId,
}

impl ConversationKey {
    /// Creates a key for the given user and channel.
    pub fn new(user: UserId, channel: ChannelId) -> Self {
        Self { user, channel }
    }

    /// The user half of the key.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// The channel half of the key.
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.channel)
    }
}
