//! Conversation bridge assembly and receive loop.
//!
//! The bridge wires a transport, a command framework and a worker pool into
//! one [`Dispatcher`]. Transports that push messages through a callback call
//! [`ConversationBridge::dispatch`] directly; transports that are polled hand
//! a [`MessageSource`] to [`ConversationBridge::run`].
//!
//! # Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use parley::adapters::{inbound_queue, InMemoryTransport};
//! # use parley::application::ConversationBridgeBuilder;
//! # use parley::ports::CommandFramework;
//! # async fn example(framework: Arc<dyn CommandFramework>) {
//! let transport = Arc::new(InMemoryTransport::new());
//! let bridge = ConversationBridgeBuilder::new(transport, framework)
//!     .prefix("!")
//!     .name("bot")
//!     .build();
//!
//! let (_sender, source) = inbound_queue(64);
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! bridge.run(source, shutdown_rx).await.ok();
//! bridge.shutdown().await;
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

use crate::adapters::TokioTaskExecutor;
use crate::config::BridgeConfig;
use crate::domain::conversation::{
    plain_message_factory, CommandTrigger, InboundMessage, MessageFactory,
};
use crate::ports::{CommandFramework, MessageSource, MessagingTransport, TaskExecutor, TransportError};

use super::{CommandRunner, ConversationServices, DispatchOutcome, Dispatcher, PendingRegistry};

const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that stop the receive loop.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Message source failed: {0}")]
    Transport(#[from] TransportError),
}

/// Builder for [`ConversationBridge`].
pub struct ConversationBridgeBuilder {
    transport: Arc<dyn MessagingTransport>,
    framework: Arc<dyn CommandFramework>,
    prefix: String,
    name: String,
    reply_timeout: Duration,
    executor: Option<Arc<dyn TaskExecutor>>,
    message_factory: MessageFactory,
}

impl ConversationBridgeBuilder {
    /// Starts a builder with prefix `!`, no name, a 60 second reply timeout,
    /// an unbounded Tokio pool and plain outbound messages.
    pub fn new(
        transport: Arc<dyn MessagingTransport>,
        framework: Arc<dyn CommandFramework>,
    ) -> Self {
        Self {
            transport,
            framework,
            prefix: "!".to_string(),
            name: String::new(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            executor: None,
            message_factory: plain_message_factory(),
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// How long a command waits for each reply. `Duration::MAX` waits
    /// indefinitely.
    pub fn reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Runs commands on `executor` instead of the default Tokio pool.
    pub fn executor(mut self, executor: Arc<dyn TaskExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn message_factory(mut self, factory: MessageFactory) -> Self {
        self.message_factory = factory;
        self
    }

    /// Applies trigger, timeout and pool size from configuration.
    pub fn with_config(mut self, config: &BridgeConfig) -> Self {
        self.prefix = config.prefix.clone();
        self.name = config.name.clone();
        self.reply_timeout = config.reply_timeout();
        if let Some(limit) = config.max_concurrent_commands {
            self.executor = Some(Arc::new(TokioTaskExecutor::bounded(limit)));
        }
        self
    }

    /// Assembles the bridge.
    pub fn build(self) -> ConversationBridge {
        let trigger = CommandTrigger::new(self.prefix, self.name);
        if trigger.matches_everything() {
            tracing::warn!("Empty command trigger: every message will start a command");
        }

        let executor = self
            .executor
            .unwrap_or_else(|| Arc::new(TokioTaskExecutor::unbounded()));
        let registry = Arc::new(PendingRegistry::new());
        let runner = Arc::new(CommandRunner::new(
            self.framework,
            ConversationServices {
                registry: registry.clone(),
                transport: self.transport,
                message_factory: self.message_factory,
                reply_timeout: self.reply_timeout,
            },
        ));

        tracing::info!(
            program = %trigger.program(),
            reply_timeout = ?self.reply_timeout,
            "Conversation bridge ready"
        );

        ConversationBridge {
            dispatcher: Dispatcher::new(trigger, registry.clone(), runner, executor.clone()),
            registry,
            executor,
        }
    }
}

/// A running conversation bridge.
pub struct ConversationBridge {
    dispatcher: Dispatcher,
    registry: Arc<PendingRegistry>,
    executor: Arc<dyn TaskExecutor>,
}

impl ConversationBridge {
    /// Routes one inbound message. Never blocks.
    pub fn dispatch(&self, message: InboundMessage) -> DispatchOutcome {
        self.dispatcher.dispatch(message)
    }

    /// Registry of commands currently waiting for a reply.
    pub fn registry(&self) -> &Arc<PendingRegistry> {
        &self.registry
    }

    /// Number of command invocations still running.
    pub fn in_flight(&self) -> usize {
        self.executor.in_flight()
    }

    /// Dispatch messages from `source` until shutdown is signalled or the
    /// source is exhausted.
    ///
    /// Commands started by the loop keep running after it returns; call
    /// [`shutdown`](Self::shutdown) to drain them.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Transport` if the source fails.
    pub async fn run<S>(
        &self,
        mut source: S,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), BridgeError>
    where
        S: MessageSource,
    {
        if *shutdown.borrow() {
            return Ok(());
        }

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender counts as a shutdown request
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Receive loop stopping on shutdown signal");
                        return Ok(());
                    }
                }
                next = source.next_message() => {
                    match next? {
                        Some(message) => {
                            self.dispatch(message);
                        }
                        None => {
                            tracing::info!("Message source closed");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Stops accepting commands and waits for running ones to finish.
    pub async fn shutdown(&self) {
        self.executor.shutdown().await;
    }

    /// Like [`shutdown`](Self::shutdown), but aborts commands still running
    /// after `grace`. Returns how many were aborted.
    pub async fn shutdown_timeout(&self, grace: Duration) -> usize {
        self.executor.shutdown_timeout(grace).await
    }
}
