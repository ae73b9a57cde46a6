//! Console transport configuration

use serde::Deserialize;

use crate::domain::foundation::{ChannelId, UserId};

use super::error::ValidationError;

/// Identity used for messages typed on the console
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// User the console speaks as
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Channel lines are posted to unless they name another one
    #[serde(default = "default_channel_id")]
    pub channel_id: String,
}

impl ConsoleConfig {
    /// Console user as a typed identifier
    pub fn user(&self) -> Result<UserId, ValidationError> {
        UserId::new(self.user_id.clone())
            .map_err(|_| ValidationError::MissingRequired("console.user_id"))
    }

    /// Console channel as a typed identifier
    pub fn channel(&self) -> Result<ChannelId, ValidationError> {
        ChannelId::new(self.channel_id.clone())
            .map_err(|_| ValidationError::MissingRequired("console.channel_id"))
    }

    /// Validate console configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.user()?;
        self.channel()?;
        Ok(())
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            channel_id: default_channel_id(),
        }
    }
}

fn default_user_id() -> String {
    "console".to_string()
}

fn default_channel_id() -> String {
    "console".to_string()
}
