//! Demo command tree served by the `parley` binary.

use async_trait::async_trait;
use clap::{Parser, Subcommand};

use parley::adapters::ClapHandler;
use parley::domain::conversation::{CommandError, Prompt};
use parley::ports::{ask_parsed, Conversation};

/// Parley demo commands
#[derive(Parser, Debug)]
#[command(version, about = "Parley demo commands")]
pub struct DemoCli {
    #[command(subcommand)]
    command: DemoCommand,
}

#[derive(Subcommand, Debug)]
enum DemoCommand {
    /// Say hello
    Greet {
        /// Who to greet
        #[arg(default_value = "world")]
        name: String,

        /// How many times
        #[arg(short, long, default_value_t = 1)]
        count: u8,
    },
    /// Ask for your name and age
    Ask,
    /// Ask for a secret in a private channel
    Secret,
    /// Ask before doing something
    Confirm {
        /// What to do
        #[arg(default_value = "continue")]
        action: String,
    },
}

pub struct DemoCommands;

#[async_trait]
impl ClapHandler for DemoCommands {
    type Args = DemoCli;

    async fn handle(
        &self,
        args: DemoCli,
        conversation: &mut dyn Conversation,
    ) -> Result<(), CommandError> {
        match args.command {
            DemoCommand::Greet { name, count } => {
                for _ in 0..count {
                    conversation.echo(&format!("Hello, {}!", name));
                }
            }
            DemoCommand::Ask => {
                let name = conversation.prompt("What is your name").await?;
                let age: u32 = ask_parsed(conversation, Prompt::new("How old are you")).await?;
                conversation.echo(&format!("Nice to meet you, {} ({}).", name, age));
            }
            DemoCommand::Secret => {
                conversation.echo("Let's take this somewhere private.");
                let secret = conversation.ask(Prompt::new("Your secret").hidden()).await?;
                conversation.echo(&format!(
                    "Your secret is {} characters long. It stays with me.",
                    secret.chars().count()
                ));
            }
            DemoCommand::Confirm { action } => {
                if !conversation
                    .confirm(&format!("Really {}?", action), Some(true))
                    .await?
                {
                    conversation.echo("Aborted!");
                    return Err(CommandError::Abort);
                }
                conversation.echo(&format!("Done: {}", action));
            }
        }
        Ok(())
    }
}
