//! Recognition and tokenization of command messages.

use thiserror::Error;

/// Why a command line could not be split into arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// Unterminated quote or dangling escape character.
    #[error("No closing quotation")]
    Unbalanced,
}

/// The text that marks a message as a command: `prefix` followed by `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTrigger {
    prefix: String,
    name: String,
}

impl CommandTrigger {
    /// Creates a trigger. Either part may be empty, but not both.
    pub fn new(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
        }
    }

    /// Program name handed to the command framework.
    pub fn program(&self) -> String {
        format!("{}{}", self.prefix, self.name)
    }

    /// Whether every message would count as a command.
    pub fn matches_everything(&self) -> bool {
        self.prefix.is_empty() && self.name.is_empty()
    }

    /// Recognizes `text` as a command and tokenizes its arguments.
    ///
    /// Returns `None` when the text does not start with the trigger. When
    /// `name` is set it must be a whole word: `!greetings` does not trigger
    /// `!greet`. Tokenization failures still yield a command line so the user
    /// gets a usage error instead of silence.
    pub fn parse(&self, text: &str) -> Option<CommandLine> {
        let rest = text.strip_prefix(self.prefix.as_str())?;
        let rest = if self.name.is_empty() {
            rest
        } else {
            let after = rest.strip_prefix(self.name.as_str())?;
            if !(after.is_empty() || after.starts_with(char::is_whitespace)) {
                return None;
            }
            after
        };

        Some(CommandLine {
            program: self.program(),
            args: tokenize(rest),
        })
    }
}

/// A recognized command message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Result<Vec<String>, TokenizeError>,
}

impl CommandLine {
    /// Program name (the trigger text).
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Tokenized arguments, or the reason tokenization failed.
    pub fn args(&self) -> Result<&[String], &TokenizeError> {
        self.args.as_deref()
    }

    /// Splits into program and arguments.
    pub fn into_parts(self) -> (String, Result<Vec<String>, TokenizeError>) {
        (self.program, self.args)
    }
}

/// Splits text into arguments with POSIX shell quoting rules.
pub fn tokenize(text: &str) -> Result<Vec<String>, TokenizeError> {
    shlex::split(text).ok_or(TokenizeError::Unbalanced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn prefix_and_name_must_lead_the_message() {
        let trigger = CommandTrigger::new("!", "greet");
        assert!(trigger.parse("!greet").is_some());
        assert!(trigger.parse("greet").is_none());
        assert!(trigger.parse("say !greet").is_none());
    }

    #[test]
    fn name_must_be_a_whole_word() {
        let trigger = CommandTrigger::new("!", "greet");
        assert!(trigger.parse("!greetings").is_none());
        assert!(trigger.parse("!greet  now").is_some());
    }

    #[test]
    fn arguments_follow_shell_quoting() {
        let trigger = CommandTrigger::new("!", "bot");
        let line = trigger.parse(r#"!bot add "two words" 'single' esc\ aped"#).unwrap();
        assert_eq!(line.program(), "!bot");
        assert_eq!(
            line.args().unwrap(),
            &["add", "two words", "single", "esc aped"]
        );
    }

    #[test]
    fn empty_name_treats_rest_as_arguments() {
        let trigger = CommandTrigger::new("!", "");
        let line = trigger.parse("!greet --loud").unwrap();
        assert_eq!(line.program(), "!");
        assert_eq!(line.args().unwrap(), &["greet", "--loud"]);
    }

    #[test]
    fn unterminated_quote_is_reported_not_dropped() {
        let trigger = CommandTrigger::new("", "command");
        let line = trigger.parse("command \"open").unwrap();
        assert_eq!(line.args(), Err(&TokenizeError::Unbalanced));
    }

    #[test]
    fn bare_trigger_has_no_arguments() {
        let line = CommandTrigger::new("", "command").parse("command").unwrap();
        assert!(line.args().unwrap().is_empty());
    }

    #[test]
    fn empty_trigger_matches_everything() {
        let trigger = CommandTrigger::new("", "");
        assert!(trigger.matches_everything());
        assert!(trigger.parse("anything at all").is_some());
    }

    proptest! {
        #[test]
        fn text_without_prefix_never_matches(text in "[a-z ]{0,30}") {
            let trigger = CommandTrigger::new("!", "bot");
            prop_assert!(trigger.parse(&text).is_none());
        }

        #[test]
        fn name_glued_to_more_text_never_matches(suffix in "[a-z0-9]{1,10}") {
            let trigger = CommandTrigger::new("!", "bot");
            let text = format!("!bot{}", suffix);
            prop_assert!(trigger.parse(&text).is_none());
        }
    }
}
