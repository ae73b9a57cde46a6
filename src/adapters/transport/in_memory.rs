//! In-memory messaging transport.
//!
//! Records every outbound message instead of delivering it, for tests and
//! for embedding the bridge where the caller inspects output directly.
//!
//! Private channels are deterministic: the channel opened for user `u` is
//! always `dm-u`, so tests can address replies to it.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

use crate::domain::conversation::OutboundMessage;
use crate::domain::foundation::{ChannelId, UserId};
use crate::ports::{MessagingTransport, TransportError};

/// Recording transport.
///
/// Features:
/// - Outbound capture in send order
/// - Switchable send failures
/// - Waiting for a number of sends with a deadline
///
/// # Example
///
/// ```ignore
/// let transport = Arc::new(InMemoryTransport::new());
///
/// // ... run a command through the bridge ...
///
/// assert!(transport.wait_for_sent(1, Duration::from_secs(1)).await);
/// assert_eq!(transport.sent_contents(), vec!["hi\n"]);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    sent: Mutex<Vec<(ChannelId, OutboundMessage)>>,
    opened: Mutex<Vec<UserId>>,
    failing: AtomicBool,
    sent_notify: Notify,
}

impl InMemoryTransport {
    /// Creates a transport with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel that `open_private_channel` returns for `user`.
    pub fn private_channel_for(user: &UserId) -> ChannelId {
        ChannelId::for_user("dm-", user)
    }

    /// Makes subsequent sends fail with a network error (or succeed again).
    pub fn fail_sends(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    // === Test Helpers ===

    /// All delivered messages with their channels, in send order.
    pub fn sent(&self) -> Vec<(ChannelId, OutboundMessage)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Contents of all delivered messages, in send order.
    pub fn sent_contents(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .map(|(_, message)| message.content)
            .collect()
    }

    /// Contents delivered to one channel, in send order.
    pub fn sent_to(&self, channel: &ChannelId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| to == channel)
            .map(|(_, message)| message.content)
            .collect()
    }

    /// Users a private channel was opened for, in call order.
    pub fn opened_private_channels(&self) -> Vec<UserId> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clears recorded messages and private channel requests.
    pub fn clear(&self) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Waits until at least `count` messages have been delivered.
    ///
    /// Returns `false` if `timeout` elapses first.
    pub async fn wait_for_sent(&self, count: usize, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            loop {
                let notified = self.sent_notify.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if self.sent_count() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .is_ok()
    }

    fn sent_count(&self) -> usize {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl MessagingTransport for InMemoryTransport {
    async fn send_message(
        &self,
        channel: &ChannelId,
        message: OutboundMessage,
    ) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::network("simulated send failure"));
        }

        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((channel.clone(), message));
        self.sent_notify.notify_waiters();
        Ok(())
    }

    async fn open_private_channel(&self, user: &UserId) -> Result<ChannelId, TransportError> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(user.clone());
        Ok(Self::private_channel_for(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn channel(id: &str) -> ChannelId {
        ChannelId::new(id).unwrap()
    }

    #[tokio::test]
    async fn send_records_message_and_channel() {
        let transport = InMemoryTransport::new();

        transport
            .send_message(&channel("general"), OutboundMessage::plain("hi\n"))
            .await
            .unwrap();

        assert_eq!(transport.sent().len(), 1);
        assert_eq!(transport.sent_to(&channel("general")), vec!["hi\n"]);
        assert!(transport.sent_to(&channel("other")).is_empty());
    }

    #[tokio::test]
    async fn failing_transport_records_nothing() {
        let transport = InMemoryTransport::new();
        transport.fail_sends(true);

        let result = transport
            .send_message(&channel("general"), OutboundMessage::plain("hi\n"))
            .await;

        assert!(matches!(result, Err(TransportError::Network(_))));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn private_channel_is_deterministic() {
        let transport = InMemoryTransport::new();
        let user = UserId::new("alice").unwrap();

        let dm = transport.open_private_channel(&user).await.unwrap();

        assert_eq!(dm.as_str(), "dm-alice");
        assert_eq!(dm, InMemoryTransport::private_channel_for(&user));
        assert_eq!(transport.opened_private_channels(), vec![user]);
    }

    #[tokio::test]
    async fn wait_for_sent_wakes_on_delivery() {
        let transport = Arc::new(InMemoryTransport::new());

        let sender = transport.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            sender
                .send_message(&channel("general"), OutboundMessage::plain("late\n"))
                .await
                .unwrap();
        });

        assert!(transport.wait_for_sent(1, Duration::from_secs(1)).await);
        assert!(!transport.wait_for_sent(2, Duration::from_millis(20)).await);
    }

    #[tokio::test]
    async fn clear_forgets_everything() {
        let transport = InMemoryTransport::new();
        let user = UserId::new("alice").unwrap();
        transport.open_private_channel(&user).await.unwrap();
        transport
            .send_message(&channel("general"), OutboundMessage::plain("x"))
            .await
            .unwrap();

        transport.clear();

        assert!(transport.sent().is_empty());
        assert!(transport.opened_private_channels().is_empty());
    }
}
