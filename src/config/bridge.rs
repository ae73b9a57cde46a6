//! Conversation bridge configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::conversation::CommandTrigger;

use super::error::ValidationError;

/// Longest reply wait accepted by validation.
const MAX_REPLY_TIMEOUT_SECS: u64 = 3600;

/// Bridge configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Text a command message starts with
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Command name following the prefix (empty: the first argument names
    /// the command)
    #[serde(default)]
    pub name: String,

    /// How long a command waits for the user's reply, in seconds
    #[serde(default = "default_reply_timeout")]
    pub reply_timeout_secs: u64,

    /// Maximum number of commands running at once (unbounded when unset)
    pub max_concurrent_commands: Option<usize>,
}

impl BridgeConfig {
    /// Trigger recognising command messages
    pub fn trigger(&self) -> CommandTrigger {
        CommandTrigger::new(self.prefix.clone(), self.name.clone())
    }

    /// Reply wait bound as a duration
    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }

    /// Validate bridge configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.trigger().matches_everything() {
            return Err(ValidationError::EmptyTrigger);
        }
        if self.reply_timeout_secs == 0 || self.reply_timeout_secs > MAX_REPLY_TIMEOUT_SECS {
            return Err(ValidationError::InvalidReplyTimeout);
        }
        if self.max_concurrent_commands == Some(0) {
            return Err(ValidationError::InvalidConcurrencyLimit);
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            name: String::new(),
            reply_timeout_secs: default_reply_timeout(),
            max_concurrent_commands: None,
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_reply_timeout() -> u64 {
    60
}
