//! Task executor adapters.

mod tokio_executor;

pub use tokio_executor::TokioTaskExecutor;
