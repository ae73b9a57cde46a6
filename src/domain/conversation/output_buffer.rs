//! Output buffering for a single conversation.
//!
//! Commands tend to print many short lines. Sending each one as its own chat
//! message spams the channel, so text accumulates here and leaves as one
//! message when the conversation flushes.

/// Accumulating text sink for one conversation.
///
/// # Invariants
///
/// - [`OutputBuffer::take_flushable`] always clears the buffer, and returns
///   `None` for empty or whitespace-only content. Callers therefore never
///   send empty messages, and a failed send cannot resend the same text on
///   the next flush.
#[derive(Debug, Default, Clone)]
pub struct OutputBuffer {
    text: String,
}

impl OutputBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw text.
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Appends text followed by a line terminator.
    pub fn push_line(&mut self, text: &str) {
        self.text.push_str(text);
        self.text.push('\n');
    }

    /// Whether anything has been written since the last flush.
    pub fn is_dirty(&self) -> bool {
        !self.text.is_empty()
    }

    /// Buffered text not yet flushed.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Clears the buffer and returns its content if it is worth sending.
    pub fn take_flushable(&mut self) -> Option<String> {
        let text = std::mem::take(&mut self.text);
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
