//! Channel-backed message source.
//!
//! Lets any platform client feed the bridge's receive loop: the client's
//! callback pushes into an [`InboundSender`], and the bridge drains the
//! matching [`QueueSource`].

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::conversation::InboundMessage;
use crate::ports::{MessageSource, TransportError};

/// Creates a bounded inbound queue.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn inbound_queue(capacity: usize) -> (InboundSender, QueueSource) {
    let (tx, rx) = mpsc::channel(capacity);
    (InboundSender { tx }, QueueSource { rx })
}

/// Producer half of an inbound queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct InboundSender {
    tx: mpsc::Sender<InboundMessage>,
}

impl InboundSender {
    /// Enqueues a message, waiting for room when the queue is full.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Closed` if the source has been dropped.
    pub async fn send(&self, message: InboundMessage) -> Result<(), TransportError> {
        self.tx
            .send(message)
            .await
            .map_err(|_| TransportError::Closed)
    }

    /// Enqueues a message without waiting.
    ///
    /// For callbacks that cannot await. A full queue is reported as a
    /// network error so the caller can log and drop the message.
    pub fn try_send(&self, message: InboundMessage) -> Result<(), TransportError> {
        self.tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::network("inbound queue full"),
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

/// Consumer half of an inbound queue.
///
/// Exhausted once every sender has been dropped and the queue is drained.
#[derive(Debug)]
pub struct QueueSource {
    rx: mpsc::Receiver<InboundMessage>,
}

#[async_trait]
impl MessageSource for QueueSource {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>, TransportError> {
        Ok(self.rx.recv().await)
    }
}
