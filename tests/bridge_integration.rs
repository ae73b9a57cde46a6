//! End-to-end tests: chat messages in, command output out.
//!
//! Drives the whole bridge (dispatcher, runner, registry, worker pool)
//! through the clap framework adapter and the recording in-memory transport.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tokio::sync::watch;

use parley::adapters::{inbound_queue, ClapCommandFramework, ClapHandler, InMemoryTransport};
use parley::application::{
    CommandHandle, ConversationBridge, ConversationBridgeBuilder, DispatchOutcome,
};
use parley::domain::conversation::{
    CommandError, ConversationKey, InboundMessage, InvocationOutcome, Prompt,
};
use parley::domain::foundation::{ChannelId, UserId};
use parley::ports::{ask_parsed, Conversation};

// =============================================================================
// Test command tree
// =============================================================================

#[derive(Parser, Debug)]
#[command(about = "Test bot")]
struct TestCli {
    #[command(subcommand)]
    command: TestCommand,
}

#[derive(Subcommand, Debug)]
enum TestCommand {
    /// Say hi
    Greet,
    /// Two lines of output
    Pair,
    /// Ask for a name
    Ask,
    /// Ask for a password privately
    Login,
    /// Ask for a number and double it
    Double,
    /// Print, then panic
    Explode,
    /// Fail with an internal error
    Fail,
}

struct TestCommands;

#[async_trait]
impl ClapHandler for TestCommands {
    type Args = TestCli;

    async fn handle(
        &self,
        args: TestCli,
        conversation: &mut dyn Conversation,
    ) -> Result<(), CommandError> {
        match args.command {
            TestCommand::Greet => conversation.echo("hi"),
            TestCommand::Pair => {
                conversation.echo("a");
                conversation.echo("b");
            }
            TestCommand::Ask => {
                let asker = conversation.message().author.clone();
                let name = conversation.prompt("name?").await?;
                conversation.echo(&format!("{} is {}", asker, name));
            }
            TestCommand::Login => {
                let password = conversation.ask(Prompt::new("password").hidden()).await?;
                conversation.echo(&format!("{} chars", password.chars().count()));
            }
            TestCommand::Double => {
                let n: u32 = ask_parsed(conversation, Prompt::new("number")).await?;
                conversation.echo(&(n * 2).to_string());
            }
            TestCommand::Explode => {
                conversation.echo("before");
                panic!("kaboom");
            }
            TestCommand::Fail => return Err(CommandError::fault("backend down")),
        }
        Ok(())
    }
}

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    bridge: ConversationBridge,
    transport: Arc<InMemoryTransport>,
}

impl Harness {
    fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5))
    }

    fn with_timeout(reply_timeout: Duration) -> Self {
        let transport = Arc::new(InMemoryTransport::new());
        let bridge = ConversationBridgeBuilder::new(
            transport.clone(),
            Arc::new(ClapCommandFramework::new(TestCommands)),
        )
        .prefix("!")
        .name("bot")
        .reply_timeout(reply_timeout)
        .build();

        Self { bridge, transport }
    }

    fn start(&self, message: InboundMessage) -> CommandHandle {
        match self.bridge.dispatch(message) {
            DispatchOutcome::StartsCommand(handle) => handle,
            other => panic!("expected a command to start, got {:?}", other),
        }
    }

    fn reply(&self, message: InboundMessage) {
        assert!(matches!(
            self.bridge.dispatch(message),
            DispatchOutcome::ResolvesConversation
        ));
    }

    async fn wait_for_pending(&self, key: &ConversationKey) {
        for _ in 0..400 {
            if self.bridge.registry().is_pending(key) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("no pending wait registered for {}", key);
    }
}

fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

fn channel(id: &str) -> ChannelId {
    ChannelId::new(id).unwrap()
}

fn message(author: &str, channel_id: &str, content: &str) -> InboundMessage {
    InboundMessage::new(user(author), channel(channel_id), content)
}

fn key(author: &str, channel_id: &str) -> ConversationKey {
    ConversationKey::new(user(author), channel(channel_id))
}

// =============================================================================
// Output
// =============================================================================

#[tokio::test]
async fn single_echo_is_sent_once() {
    let h = Harness::new();

    let outcome = h.start(message("u", "general", "!bot greet")).outcome().await;

    assert_eq!(outcome, Some(InvocationOutcome::Completed));
    assert_eq!(h.transport.sent_to(&channel("general")), vec!["hi\n"]);
}

#[tokio::test]
async fn consecutive_echoes_are_batched() {
    let h = Harness::new();

    h.start(message("u", "general", "!bot pair")).outcome().await;

    assert_eq!(h.transport.sent_contents(), vec!["a\nb\n"]);
}

#[tokio::test]
async fn unrelated_chatter_is_ignored() {
    let h = Harness::new();

    assert!(matches!(
        h.bridge.dispatch(message("u", "general", "hello everyone")),
        DispatchOutcome::NoOp
    ));
    assert!(matches!(
        h.bridge.dispatch(message("u", "general", "!botany is fun")),
        DispatchOutcome::NoOp
    ));
    assert!(h.transport.sent().is_empty());
}

// =============================================================================
// Replies
// =============================================================================

#[tokio::test]
async fn prompt_is_sent_before_reply_is_accepted() {
    let h = Harness::new();

    let handle = h.start(message("u", "general", "!bot ask"));
    h.wait_for_pending(&key("u", "general")).await;
    assert!(h.transport.wait_for_sent(1, Duration::from_secs(1)).await);
    assert_eq!(h.transport.sent_contents(), vec!["name?: "]);

    h.reply(message("u", "general", "Bob"));

    assert_eq!(handle.outcome().await, Some(InvocationOutcome::Completed));
    assert_eq!(h.transport.sent_contents(), vec!["name?: ", "u is Bob\n"]);
    assert!(h.bridge.registry().is_empty());
}

#[tokio::test]
async fn reply_that_looks_like_a_command_is_still_a_reply() {
    let h = Harness::new();

    let handle = h.start(message("u", "general", "!bot ask"));
    h.wait_for_pending(&key("u", "general")).await;
    h.reply(message("u", "general", "!bot greet"));

    handle.outcome().await;
    assert_eq!(
        h.transport.sent_contents(),
        vec!["name?: ", "u is !bot greet\n"]
    );
}

#[tokio::test]
async fn unanswered_prompt_times_out_and_frees_the_conversation() {
    let h = Harness::with_timeout(Duration::from_millis(50));

    let outcome = h.start(message("u", "general", "!bot ask")).outcome().await;

    assert_eq!(outcome, Some(InvocationOutcome::TimedOut));
    assert!(h.bridge.registry().is_empty());

    // A late reply is just chatter; a late command starts afresh
    assert!(matches!(
        h.bridge.dispatch(message("u", "general", "Bob")),
        DispatchOutcome::NoOp
    ));
    let outcome = h.start(message("u", "general", "!bot greet")).outcome().await;
    assert_eq!(outcome, Some(InvocationOutcome::Completed));
    assert_eq!(h.transport.sent_contents(), vec!["name?: ", "hi\n"]);
}

#[tokio::test]
async fn unbounded_reply_timeout_keeps_waiting() {
    let h = Harness::with_timeout(Duration::MAX);

    let handle = h.start(message("u", "general", "!bot ask"));
    h.wait_for_pending(&key("u", "general")).await;
    assert!(h.transport.wait_for_sent(1, Duration::from_secs(1)).await);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(h.bridge.registry().is_pending(&key("u", "general")));
    assert_eq!(h.bridge.in_flight(), 1);

    h.transport.clear();
    h.reply(message("u", "general", "Bob"));

    assert_eq!(handle.outcome().await, Some(InvocationOutcome::Completed));
    assert_eq!(h.transport.sent_contents(), vec!["u is Bob\n"]);
}

#[tokio::test]
async fn concurrent_conversations_receive_their_own_replies() {
    let h = Harness::new();

    let first = h.start(message("u1", "general", "!bot ask"));
    let second = h.start(message("u2", "general", "!bot ask"));
    h.wait_for_pending(&key("u1", "general")).await;
    h.wait_for_pending(&key("u2", "general")).await;

    // Answer in the opposite order
    h.reply(message("u2", "general", "Bea"));
    h.reply(message("u1", "general", "Al"));

    assert_eq!(second.outcome().await, Some(InvocationOutcome::Completed));
    assert_eq!(first.outcome().await, Some(InvocationOutcome::Completed));

    let sent = h.transport.sent_contents();
    assert!(sent.contains(&"u1 is Al\n".to_string()));
    assert!(sent.contains(&"u2 is Bea\n".to_string()));
}

#[tokio::test]
async fn same_user_in_other_channel_is_not_a_reply() {
    let h = Harness::new();

    let handle = h.start(message("u", "general", "!bot ask"));
    h.wait_for_pending(&key("u", "general")).await;

    assert!(matches!(
        h.bridge.dispatch(message("u", "random", "Bob")),
        DispatchOutcome::NoOp
    ));
    h.reply(message("u", "general", "Bob"));

    assert_eq!(handle.outcome().await, Some(InvocationOutcome::Completed));
}

#[tokio::test]
async fn invalid_value_is_explained_and_asked_again() {
    let h = Harness::new();
    let k = key("u", "general");

    let handle = h.start(message("u", "general", "!bot double"));
    h.wait_for_pending(&k).await;
    h.reply(message("u", "general", "abc"));
    h.wait_for_pending(&k).await;
    h.reply(message("u", "general", "21"));

    assert_eq!(handle.outcome().await, Some(InvocationOutcome::Completed));
    assert_eq!(
        h.transport.sent_contents(),
        vec![
            "number: ",
            "Error: 'abc' is not a valid value.\nnumber: ",
            "42\n"
        ]
    );
}

// =============================================================================
// Private channels
// =============================================================================

#[tokio::test]
async fn hidden_prompt_continues_in_private_channel() {
    let h = Harness::new();
    let dm = InMemoryTransport::private_channel_for(&user("u"));

    let handle = h.start(message("u", "general", "!bot login"));
    h.wait_for_pending(&ConversationKey::new(user("u"), dm.clone()))
        .await;
    h.reply(InboundMessage::new(user("u"), dm.clone(), "hunter2").in_private_channel());

    assert_eq!(handle.outcome().await, Some(InvocationOutcome::Completed));
    assert_eq!(h.transport.sent_to(&dm), vec!["password: ", "7 chars\n"]);
    assert!(h.transport.sent_to(&channel("general")).is_empty());
    assert_eq!(h.transport.opened_private_channels(), vec![user("u")]);
}

#[tokio::test]
async fn command_from_private_channel_stays_there() {
    let h = Harness::new();
    let dm = channel("dm-existing");

    let handle = h.start(InboundMessage::new(user("u"), dm.clone(), "!bot login").in_private_channel());
    h.wait_for_pending(&ConversationKey::new(user("u"), dm.clone()))
        .await;
    h.reply(InboundMessage::new(user("u"), dm.clone(), "pw").in_private_channel());

    assert_eq!(handle.outcome().await, Some(InvocationOutcome::Completed));
    assert_eq!(h.transport.sent_to(&dm), vec!["password: ", "2 chars\n"]);
    assert!(h.transport.opened_private_channels().is_empty());
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn unknown_subcommand_shows_usage() {
    let h = Harness::new();

    let outcome = h.start(message("u", "general", "!bot dance")).outcome().await;

    assert_eq!(outcome, Some(InvocationOutcome::UsageError));
    let sent = h.transport.sent_contents();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("dance"));
    assert!(sent[0].contains("Usage: !bot"));
}

#[tokio::test]
async fn unbalanced_quote_shows_usage() {
    let h = Harness::new();

    let outcome = h
        .start(message("u", "general", "!bot greet \"oops"))
        .outcome()
        .await;

    assert_eq!(outcome, Some(InvocationOutcome::UsageError));
    let sent = h.transport.sent_contents();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("No closing quotation"));
}

#[tokio::test]
async fn help_is_shown_and_exits() {
    let h = Harness::new();

    let outcome = h.start(message("u", "general", "!bot --help")).outcome().await;

    assert_eq!(outcome, Some(InvocationOutcome::EarlyExit));
    let sent = h.transport.sent_contents();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Usage: !bot"));
    assert!(sent[0].contains("greet"));
}

#[tokio::test]
async fn internal_failure_is_not_shown_to_user() {
    let h = Harness::new();

    let outcome = h.start(message("u", "general", "!bot fail")).outcome().await;

    assert_eq!(outcome, Some(InvocationOutcome::Faulted));
    assert!(h.transport.sent().is_empty());
}

#[tokio::test]
async fn panic_flushes_output_and_bridge_keeps_working() {
    let h = Harness::new();

    let outcome = h.start(message("u", "general", "!bot explode")).outcome().await;
    assert_eq!(outcome, Some(InvocationOutcome::Faulted));

    let outcome = h.start(message("u", "general", "!bot greet")).outcome().await;
    assert_eq!(outcome, Some(InvocationOutcome::Completed));

    assert_eq!(h.transport.sent_contents(), vec!["before\n", "hi\n"]);
}

#[tokio::test]
async fn failed_send_is_contained() {
    let h = Harness::new();
    h.transport.fail_sends(true);

    let outcome = h.start(message("u", "general", "!bot greet")).outcome().await;

    assert_eq!(outcome, Some(InvocationOutcome::Completed));
    assert!(h.transport.sent().is_empty());
}

// =============================================================================
// Receive loop
// =============================================================================

#[tokio::test]
async fn receive_loop_runs_a_whole_conversation() {
    let h = Arc::new(Harness::new());
    let (sender, source) = inbound_queue(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let looping = h.clone();
    let receive_loop = tokio::spawn(async move { looping.bridge.run(source, shutdown_rx).await });

    sender.send(message("u", "general", "!bot ask")).await.unwrap();
    h.wait_for_pending(&key("u", "general")).await;
    sender.send(message("u", "general", "Bob")).await.unwrap();

    assert!(h.transport.wait_for_sent(2, Duration::from_secs(2)).await);
    assert_eq!(h.transport.sent_contents(), vec!["name?: ", "u is Bob\n"]);

    shutdown_tx.send(true).unwrap();
    assert!(receive_loop.await.unwrap().is_ok());
    h.bridge.shutdown().await;
    assert_eq!(h.bridge.in_flight(), 0);
}

#[tokio::test]
async fn shutdown_aborts_commands_still_waiting() {
    let h = Harness::new();

    let handle = h.start(message("u", "general", "!bot ask"));
    h.wait_for_pending(&key("u", "general")).await;

    let aborted = h.bridge.shutdown_timeout(Duration::from_millis(20)).await;

    assert_eq!(aborted, 1);
    assert_eq!(handle.outcome().await, None);
    assert!(h.bridge.registry().is_empty());
    assert!(matches!(
        h.bridge.dispatch(message("v", "general", "!bot greet")),
        DispatchOutcome::NoOp
    ));
}
