//! Tokio task pool for command invocations.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use crate::ports::{ExecutorError, TaskExecutor};

/// Runs each submitted task on the Tokio runtime.
///
/// Unbounded by default. A bounded pool still accepts every submission
/// immediately; tasks beyond the limit wait for a permit before running.
///
/// # Panics
///
/// `submit` panics if called outside a Tokio runtime.
pub struct TokioTaskExecutor {
    tasks: Mutex<JoinSet<()>>,
    limit: Option<Arc<Semaphore>>,
    accepting: AtomicBool,
}

impl TokioTaskExecutor {
    /// Creates a pool with no concurrency limit.
    pub fn unbounded() -> Self {
        Self {
            tasks: Mutex::new(JoinSet::new()),
            limit: None,
            accepting: AtomicBool::new(true),
        }
    }

    /// Creates a pool running at most `max_concurrent` tasks at once.
    pub fn bounded(max_concurrent: usize) -> Self {
        Self {
            limit: Some(Arc::new(Semaphore::new(max_concurrent.max(1)))),
            ..Self::unbounded()
        }
    }

    fn take_tasks(&self) -> JoinSet<()> {
        std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for TokioTaskExecutor {
    fn default() -> Self {
        Self::unbounded()
    }
}

fn log_join_result(result: Result<(), JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            tracing::error!(error = %e, "Command task panicked");
        } else {
            tracing::debug!(error = %e, "Command task cancelled");
        }
    }
}

async fn drain(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.join_next().await {
        log_join_result(result);
    }
}

#[async_trait]
impl TaskExecutor for TokioTaskExecutor {
    fn submit(&self, task: BoxFuture<'static, ()>) -> Result<(), ExecutorError> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(ExecutorError::ShutDown);
        }

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        while let Some(result) = tasks.try_join_next() {
            log_join_result(result);
        }

        match &self.limit {
            Some(semaphore) => {
                let semaphore = Arc::clone(semaphore);
                tasks.spawn(async move {
                    // The semaphore is never closed
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return;
                    };
                    task.await;
                });
            }
            None => {
                tasks.spawn(task);
            }
        }
        Ok(())
    }

    fn in_flight(&self) -> usize {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        while let Some(result) = tasks.try_join_next() {
            log_join_result(result);
        }
        tasks.len()
    }

    async fn shutdown(&self) {
        self.accepting.store(false, Ordering::SeqCst);
        let mut tasks = self.take_tasks();
        tracing::info!(in_flight = tasks.len(), "Draining command tasks");
        drain(&mut tasks).await;
    }

    async fn shutdown_timeout(&self, grace: Duration) -> usize {
        self.accepting.store(false, Ordering::SeqCst);
        let mut tasks = self.take_tasks();

        if tokio::time::timeout(grace, drain(&mut tasks)).await.is_ok() {
            return 0;
        }

        let aborted = tasks.len();
        tracing::warn!(aborted, "Aborting command tasks still running after grace period");
        tasks.abort_all();
        drain(&mut tasks).await;
        aborted
    }
}
