//! Console transport: a terminal standing in for a chat platform.
//!
//! Every input line is a message from one configured user. A line starting
//! with `#name ` is posted to channel `name` instead of the default channel;
//! `#dm-<user>` addresses the user's private channel. Outbound messages are
//! printed as `[channel] content`.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::domain::conversation::{InboundMessage, OutboundMessage};
use crate::domain::foundation::{ChannelId, UserId};
use crate::ports::{MessageSource, MessagingTransport, TransportError};

const PRIVATE_CHANNEL_PREFIX: &str = "dm-";

fn private_channel(user: &UserId) -> ChannelId {
    ChannelId::for_user(PRIVATE_CHANNEL_PREFIX, user)
}

/// Writes outbound messages to a terminal (or any async writer).
pub struct ConsoleTransport<W> {
    out: Mutex<W>,
}

impl<W> ConsoleTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> MessagingTransport for ConsoleTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send_message(
        &self,
        channel: &ChannelId,
        message: OutboundMessage,
    ) -> Result<(), TransportError> {
        let rendered = format!("[{}] {}", channel, message.content);
        let mut out = self.out.lock().await;
        out.write_all(rendered.as_bytes())
            .await
            .map_err(|e| TransportError::network(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| TransportError::network(e.to_string()))
    }

    async fn open_private_channel(&self, user: &UserId) -> Result<ChannelId, TransportError> {
        Ok(private_channel(user))
    }
}

/// Reads inbound messages from a terminal (or any async line reader).
pub struct ConsoleSource<R> {
    input: R,
    user: UserId,
    channel: ChannelId,
}

impl<R> ConsoleSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Creates a source attributing every line to `user`, posted to `channel`
    /// unless the line names another one.
    pub fn new(input: R, user: UserId, channel: ChannelId) -> Self {
        Self {
            input,
            user,
            channel,
        }
    }

    fn parse_line(&self, line: &str) -> InboundMessage {
        let (channel, content) = match line.strip_prefix('#') {
            Some(rest) => {
                let (name, content) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                match ChannelId::new(name) {
                    Ok(channel) => (channel, content.trim_start()),
                    Err(_) => (self.channel.clone(), line),
                }
            }
            None => (self.channel.clone(), line),
        };

        let private = channel == private_channel(&self.user);
        let message = InboundMessage::new(self.user.clone(), channel, content);
        if private {
            message.in_private_channel()
        } else {
            message
        }
    }
}

#[async_trait]
impl<R> MessageSource for ConsoleSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_message(&mut self) -> Result<Option<InboundMessage>, TransportError> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .input
                .read_line(&mut line)
                .await
                .map_err(|e| TransportError::network(e.to_string()))?;
            if read == 0 {
                return Ok(None);
            }

            let text = line.trim_end_matches(['\r', '\n']);
            if !text.trim().is_empty() {
                return Ok(Some(self.parse_line(text)));
            }
        }
    }
}
