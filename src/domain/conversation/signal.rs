//! One-shot handoff between the inbound message path and a waiting command.
//!
//! A command that needs the user's next message registers a signal and
//! suspends on [`OneShotSignal::wait`]. The dispatcher, on receiving the
//! matching message, calls [`OneShotSignal::complete_with`], which stores the
//! message and wakes the waiter. No polling is involved.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use super::InboundMessage;

/// Single-use, thread-safe handoff of one inbound message.
///
/// # Invariants
///
/// - Completion happens at most once; later `complete_with` calls are no-ops
///   and report `false`.
/// - Once completed, the stored value never changes.
#[derive(Debug, Default)]
pub struct OneShotSignal {
    value: Mutex<Option<InboundMessage>>,
    notify: Notify,
}

impl OneShotSignal {
    /// Creates an uncompleted signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the signal is completed or `timeout` elapses.
    ///
    /// Returns `true` iff the signal was completed before the deadline.
    /// Returns immediately if the signal is already completed. A timeout too
    /// large to represent as a deadline waits without one.
    pub async fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);

        loop {
            // Register interest before checking state so a completion
            // racing with this check still wakes us.
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_completed() {
                return true;
            }

            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        return self.is_completed();
                    }
                }
                None => notified.await,
            }
        }
    }

    /// Stores `value` and wakes any waiter.
    ///
    /// Returns `true` if this call completed the signal, `false` if it had
    /// already been completed (the original value is kept).
    pub fn complete_with(&self, value: InboundMessage) -> bool {
        {
            let mut slot = self.slot();
            if slot.is_some() {
                return false;
            }
            *slot = Some(value);
        }
        self.notify.notify_waiters();
        true
    }

    /// Whether the signal has been completed.
    pub fn is_completed(&self) -> bool {
        self.slot().is_some()
    }

    /// The completed value, if any.
    pub fn result(&self) -> Option<InboundMessage> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<InboundMessage>> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ChannelId, UserId};
    use std::sync::Arc;

    fn message(content: &str) -> InboundMessage {
        InboundMessage::new(
            UserId::new("user").unwrap(),
            ChannelId::new("channel").unwrap(),
            content,
        )
    }

    #[tokio::test]
    async fn wait_times_out_without_completion() {
        let signal = OneShotSignal::new();
        assert!(!signal.wait(Duration::from_millis(20)).await);
        assert!(signal.result().is_none());
    }

    #[tokio::test]
    async fn wait_returns_true_when_completed_by_another_task() {
        let signal = Arc::new(OneShotSignal::new());
        let completer = signal.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            completer.complete_with(message("Bob"));
        });

        assert!(signal.wait(Duration::from_secs(2)).await);
        assert_eq!(signal.result().unwrap().content, "Bob");
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_already_completed() {
        let signal = OneShotSignal::new();
        signal.complete_with(message("early"));

        assert!(signal.wait(Duration::from_millis(1)).await);
        assert!(signal.wait(Duration::from_millis(1)).await);
    }

    #[tokio::test]
    async fn unrepresentable_timeout_waits_for_completion() {
        let signal = Arc::new(OneShotSignal::new());
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait(Duration::MAX).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        signal.complete_with(message("late"));
        assert!(waiter.await.unwrap());
    }

    #[test]
    fn second_completion_is_a_no_op() {
        let signal = OneShotSignal::new();
        assert!(signal.complete_with(message("first")));
        assert!(!signal.complete_with(message("second")));
        assert_eq!(signal.result().unwrap().content, "first");
    }

    #[test]
    fn completion_without_waiter_does_not_block() {
        let signal = OneShotSignal::new();
        assert!(signal.complete_with(message("nobody listening")));
        assert!(signal.is_completed());
    }
}
