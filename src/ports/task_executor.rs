//! TaskExecutor port - Pluggable worker pool for command invocations.
//!
//! The inbound message path must never block, so every accepted command is
//! submitted here and runs independently. Implementations decide how many
//! commands may run at once.
//!
//! ## Lifecycle
//!
//! ```text
//! new() --> accepting --[shutdown()]--> draining --> closed
//! ```
//!
//! Once shutdown starts, `submit` fails with [`ExecutorError::ShutDown`].

use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;

/// Errors that can occur when submitting work.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutorError {
    /// The executor no longer accepts work.
    #[error("Executor is shut down")]
    ShutDown,
}

/// Port for running command tasks.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Submit a task. Returns immediately.
    fn submit(&self, task: BoxFuture<'static, ()>) -> Result<(), ExecutorError>;

    /// Number of submitted tasks that have not finished.
    fn in_flight(&self) -> usize;

    /// Stop accepting work and wait for every submitted task to finish.
    async fn shutdown(&self);

    /// Like [`TaskExecutor::shutdown`], but abort tasks still running after
    /// `grace`. Returns the number of aborted tasks.
    async fn shutdown_timeout(&self, grace: Duration) -> usize;
}
