//! Prompt rendering and reply interpretation.
//!
//! Prompts follow terminal conventions: the text is followed by `: `, a
//! default value is shown in brackets, and confirmations advertise their
//! accepted answers (`[y/N]`).

/// Message shown when a confirmation reply is neither yes nor no.
pub const INVALID_CONFIRMATION: &str = "Error: invalid input";

/// A request for a free-text reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    text: String,
    default: Option<String>,
    show_default: bool,
    hidden: bool,
}

impl Prompt {
    /// Creates a prompt with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            default: None,
            show_default: true,
            hidden: false,
        }
    }

    /// Value used when the user replies with a blank message.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Hides the default from the rendered prompt.
    pub fn without_default_hint(mut self) -> Self {
        self.show_default = false;
        self
    }

    /// Asks for the reply in a private channel.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Whether the reply must be collected privately.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Text sent to the user, e.g. `Name [anonymous]: `.
    pub fn render(&self) -> String {
        match &self.default {
            Some(default) if self.show_default => format!("{} [{}]: ", self.text, default),
            _ => format!("{}: ", self.text),
        }
    }

    /// Interprets a reply. `None` means the prompt must be repeated.
    ///
    /// Only an empty reply counts as blank; whitespace is kept verbatim.
    pub fn accept(&self, reply: &str) -> Option<String> {
        if !reply.is_empty() {
            return Some(reply.to_string());
        }
        self.default.clone()
    }
}

/// A yes/no question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    text: String,
    default: Option<bool>,
}

impl Confirmation {
    /// Creates a confirmation. `default` answers blank replies.
    pub fn new(text: impl Into<String>, default: Option<bool>) -> Self {
        Self {
            text: text.into(),
            default,
        }
    }

    /// Text sent to the user, e.g. `Continue? [y/N]: `.
    pub fn render(&self) -> String {
        let choices = match self.default {
            Some(true) => "Y/n",
            Some(false) => "y/N",
            None => "y/n",
        };
        format!("{} [{}]: ", self.text, choices)
    }

    /// Interprets a reply. `None` means the reply was not understood.
    pub fn accept(&self, reply: &str) -> Option<bool> {
        match reply.trim().to_lowercase().as_str() {
            "y" | "yes" => Some(true),
            "n" | "no" => Some(false),
            "" => self.default,
            _ => None,
        }
    }
}

/// Message shown when a reply cannot be converted to the requested type.
pub fn invalid_value_message(reply: &str) -> String {
    format!("Error: '{}' is not a valid value.", reply.trim())
}
