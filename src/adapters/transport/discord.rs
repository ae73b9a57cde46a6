//! Discord REST transport.
//!
//! Outbound side of a Discord bot: posting messages and opening direct
//! message channels through the HTTP API. Inbound messages come from the
//! gateway connection, which belongs to the caller; its `MESSAGE_CREATE`
//! payloads are turned into [`InboundMessage`]s with [`inbound_from_gateway`]
//! and fed to the bridge.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::conversation::{InboundMessage, OutboundMessage};
use crate::domain::foundation::{ChannelId, UserId};
use crate::ports::{MessagingTransport, TransportError};

/// Configuration for the Discord transport.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Bot token for authentication.
    bot_token: Secret<String>,
    /// Base URL for the API (default: https://discord.com/api/v10).
    pub api_base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl DiscordConfig {
    /// Creates a new configuration with the given bot token.
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: Secret::new(bot_token.into()),
            api_base_url: "https://discord.com/api/v10".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.bot_token.expose_secret())
    }
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateDmRequest<'a> {
    recipient_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct DmChannelResponse {
    id: String,
}

/// Discord HTTP API transport.
pub struct DiscordRestTransport {
    config: DiscordConfig,
    client: Client,
}

impl DiscordRestTransport {
    /// Creates a transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Network` if the HTTP client cannot be built.
    pub fn new(config: DiscordConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, TransportError> {
        let response = self
            .client
            .post(self.url(path))
            .header("Authorization", self.config.authorization())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::network(format!("Request timed out: {}", e))
                } else if e.is_connect() {
                    TransportError::network(format!("Connection failed: {}", e))
                } else {
                    TransportError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        tracing::warn!(%status, path, "Discord API rejected request");
        Err(TransportError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl MessagingTransport for DiscordRestTransport {
    async fn send_message(
        &self,
        channel: &ChannelId,
        message: OutboundMessage,
    ) -> Result<(), TransportError> {
        let path = format!("/channels/{}/messages", channel);
        self.post(
            &path,
            &CreateMessageRequest {
                content: &message.content,
            },
        )
        .await?;
        Ok(())
    }

    async fn open_private_channel(&self, user: &UserId) -> Result<ChannelId, TransportError> {
        let response = self
            .post(
                "/users/@me/channels",
                &CreateDmRequest {
                    recipient_id: user.as_str(),
                },
            )
            .await?;

        let channel: DmChannelResponse = response
            .json()
            .await
            .map_err(|e| TransportError::invalid_payload(format!("DM channel response: {}", e)))?;

        ChannelId::new(channel.id).map_err(|e| TransportError::invalid_payload(e.to_string()))
    }
}

/// Author of a gateway message.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageAuthor {
    pub id: String,
    #[serde(default)]
    pub bot: bool,
}

/// The fields of a gateway `MESSAGE_CREATE` event the bridge uses.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageCreateEvent {
    #[serde(default)]
    pub content: String,
    pub channel_id: String,
    pub author: MessageAuthor,
    /// Absent for direct messages.
    #[serde(default)]
    pub guild_id: Option<String>,
}

impl MessageCreateEvent {
    /// Whether the message was written by a bot (including this one).
    pub fn is_from_bot(&self) -> bool {
        self.author.bot
    }

    /// Converts to an inbound message. Messages outside a guild are private.
    pub fn into_inbound(self) -> Result<InboundMessage, TransportError> {
        let author =
            UserId::new(self.author.id).map_err(|e| TransportError::invalid_payload(e.to_string()))?;
        let channel =
            ChannelId::new(self.channel_id).map_err(|e| TransportError::invalid_payload(e.to_string()))?;

        let message = InboundMessage::new(author, channel, self.content);
        Ok(if self.guild_id.is_none() {
            message.in_private_channel()
        } else {
            message
        })
    }
}

/// Parses the `d` payload of a `MESSAGE_CREATE` event.
///
/// Returns `Ok(None)` for messages written by bots so the bridge never
/// answers itself.
pub fn inbound_from_gateway(
    payload: serde_json::Value,
) -> Result<Option<InboundMessage>, TransportError> {
    let event: MessageCreateEvent = serde_json::from_value(payload)
        .map_err(|e| TransportError::invalid_payload(format!("MESSAGE_CREATE: {}", e)))?;

    if event.is_from_bot() {
        return Ok(None);
    }
    event.into_inbound().map(Some)
}
