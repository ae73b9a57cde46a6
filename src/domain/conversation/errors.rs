//! Command termination taxonomy.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Boxed error carried by [`CommandError::Fault`].
pub type FaultSource = Box<dyn StdError + Send + Sync + 'static>;

/// Why a command invocation stopped before returning normally.
///
/// Every variant is absorbed at the invocation boundary; none escapes into
/// the worker pool.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Bad arguments or an unparseable command line. The text is shown to
    /// the user.
    #[error("{0}")]
    Usage(String),

    /// The command finished early on purpose (e.g. after printing help).
    #[error("command exited")]
    Exit,

    /// The command gave up on purpose.
    #[error("command aborted")]
    Abort,

    /// No reply arrived while waiting for the user.
    #[error("timed out after {timeout:?} while waiting for user response")]
    ReplyTimeout { timeout: Duration },

    /// Anything else. Logged for operators, never shown to the user.
    #[error("unhandled error in command handler: {0}")]
    Fault(#[source] FaultSource),
}

impl CommandError {
    /// Creates a usage error with the given user-facing text.
    pub fn usage(text: impl Into<String>) -> Self {
        CommandError::Usage(text.into())
    }

    /// Wraps any error (or message) as an unhandled fault.
    pub fn fault(source: impl Into<FaultSource>) -> Self {
        CommandError::Fault(source.into())
    }

    /// The outcome this error classifies as.
    pub fn outcome(&self) -> InvocationOutcome {
        match self {
            CommandError::Usage(_) => InvocationOutcome::UsageError,
            CommandError::Exit => InvocationOutcome::EarlyExit,
            CommandError::Abort => InvocationOutcome::Aborted,
            CommandError::ReplyTimeout { .. } => InvocationOutcome::TimedOut,
            CommandError::Fault(_) => InvocationOutcome::Faulted,
        }
    }
}

/// How a command invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationOutcome {
    Completed,
    UsageError,
    EarlyExit,
    Aborted,
    TimedOut,
    Faulted,
}

impl InvocationOutcome {
    /// Classifies the result returned by the command framework.
    pub fn of(result: &Result<(), CommandError>) -> Self {
        match result {
            Ok(()) => InvocationOutcome::Completed,
            Err(e) => e.outcome(),
        }
    }
}

impl fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InvocationOutcome::Completed => "completed",
            InvocationOutcome::UsageError => "usage_error",
            InvocationOutcome::EarlyExit => "early_exit",
            InvocationOutcome::Aborted => "aborted",
            InvocationOutcome::TimedOut => "timed_out",
            InvocationOutcome::Faulted => "faulted",
        };
        write!(f, "{}", s)
    }
}
