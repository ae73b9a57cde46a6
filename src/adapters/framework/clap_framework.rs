//! Command framework backed by clap.
//!
//! Commands are declared with clap's derive API and implemented by a
//! [`ClapHandler`]. Parsing happens exactly as on a terminal, except that
//! whatever clap would print goes to the conversation instead:
//!
//! | clap result                    | Conversation receives  | Ends with        |
//! |--------------------------------|------------------------|------------------|
//! | parsed                         | handler output         | handler result   |
//! | `--help` / `--version`         | help or version text   | `Exit`           |
//! | any other parse error          | rendered error + usage | `Usage`          |

use async_trait::async_trait;
use clap::error::ErrorKind;
use clap::{ColorChoice, Command, FromArgMatches, Parser};
use std::iter;

use crate::domain::conversation::CommandError;
use crate::ports::{CommandFramework, Conversation};

/// Implementation of a clap command tree.
#[async_trait]
pub trait ClapHandler: Send + Sync {
    /// Parsed arguments (usually a `#[derive(Parser)]` struct with subcommands).
    type Args: Parser + Send + 'static;

    /// Runs the command.
    async fn handle(
        &self,
        args: Self::Args,
        conversation: &mut dyn Conversation,
    ) -> Result<(), CommandError>;
}

/// [`CommandFramework`] running a clap command tree.
pub struct ClapCommandFramework<H> {
    command: Command,
    handler: H,
}

impl<H: ClapHandler> ClapCommandFramework<H> {
    pub fn new(handler: H) -> Self {
        Self {
            command: <H::Args as clap::CommandFactory>::command().color(ColorChoice::Never),
            handler,
        }
    }

    /// Command tree as shown under `program`.
    fn command_for(&self, program: &str) -> Command {
        self.command.clone().bin_name(program.to_string())
    }
}

#[async_trait]
impl<H: ClapHandler> CommandFramework for ClapCommandFramework<H> {
    async fn invoke(
        &self,
        program: &str,
        args: Vec<String>,
        conversation: &mut dyn Conversation,
    ) -> Result<(), CommandError> {
        let mut command = self.command_for(program);
        let argv = iter::once(program.to_string()).chain(args);

        let parsed = command
            .try_get_matches_from_mut(argv)
            .and_then(|matches| H::Args::from_arg_matches(&matches));

        let args = match parsed {
            Ok(args) => args,
            Err(e) => match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    conversation.write(&e.to_string());
                    return Err(CommandError::Exit);
                }
                _ => return Err(CommandError::usage(e.to_string())),
            },
        };

        self.handler.handle(args, conversation).await
    }

    fn usage_error(&self, program: &str, message: &str) -> CommandError {
        let error = self
            .command_for(program)
            .error(ErrorKind::InvalidValue, message);
        CommandError::usage(error.to_string())
    }
}
