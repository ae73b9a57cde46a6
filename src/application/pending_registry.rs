//! Registry of conversations waiting for the user's next message.
//!
//! A command that reads a reply registers a signal under its conversation
//! key and waits on it. Every inbound message is first offered to the
//! registry; if a signal is waiting under the message's key, the message is
//! handed over and goes no further.
//!
//! # Thread Safety
//!
//! All operations take a single short-lived lock and never hold it across
//! an await point. Check-and-act steps (remove + complete, compare + remove)
//! happen under that lock, so a resolving message and an expiring wait can
//! race on the same key without both succeeding.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::conversation::{ConversationKey, InboundMessage, OneShotSignal};

/// Concurrency-safe map from conversation key to the waiting signal.
#[derive(Debug, Default)]
pub struct PendingRegistry {
    entries: Mutex<HashMap<ConversationKey, Arc<OneShotSignal>>>,
}

impl PendingRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new wait for `key` and returns the signal to wait on.
    ///
    /// Replaces any previous entry for the key. The replaced signal is
    /// orphaned: it will never be completed and its waiter times out.
    pub fn register(&self, key: ConversationKey) -> Arc<OneShotSignal> {
        let signal = Arc::new(OneShotSignal::new());
        let previous = self.entries().insert(key.clone(), signal.clone());
        if previous.is_some() {
            tracing::debug!(conversation = %key, "Replaced pending reply wait");
        }
        signal
    }

    /// Hands `message` to the wait registered under `key`, if any.
    ///
    /// Returns `true` if a waiting signal was found and completed.
    pub fn resolve(&self, key: &ConversationKey, message: InboundMessage) -> bool {
        let mut entries = self.entries();
        match entries.remove(key) {
            Some(signal) => signal.complete_with(message),
            None => false,
        }
    }

    /// Removes the wait for `key` without completing it, provided the stored
    /// entry is still `signal`.
    ///
    /// Returns `false` if the entry was already resolved, discarded, or
    /// replaced by a newer registration.
    pub fn discard(&self, key: &ConversationKey, signal: &Arc<OneShotSignal>) -> bool {
        let mut entries = self.entries();
        match entries.get(key) {
            Some(current) if Arc::ptr_eq(current, signal) => {
                entries.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Whether a wait is registered for `key`.
    pub fn is_pending(&self, key: &ConversationKey) -> bool {
        self.entries().contains_key(key)
    }

    /// Number of outstanding waits.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether no wait is outstanding.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<ConversationKey, Arc<OneShotSignal>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
