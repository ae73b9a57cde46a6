//! Parley demo bot.
//!
//! Serves the demo command tree over the terminal: every stdin line is a
//! chat message from the configured console user. Stops on Ctrl-C or end of
//! input, then drains running commands.

mod demo;

use std::sync::Arc;
use std::time::Duration;

use tokio::io::BufReader;
use tokio::sync::watch;

use parley::adapters::{ClapCommandFramework, ConsoleSource, ConsoleTransport};
use parley::application::ConversationBridgeBuilder;
use parley::config::AppConfig;

use demo::DemoCommands;

/// How long running commands may keep going after shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    config.validate()?;
    config.logging.init()?;

    let transport = Arc::new(ConsoleTransport::new(tokio::io::stdout()));
    let framework = Arc::new(ClapCommandFramework::new(DemoCommands));
    let bridge = ConversationBridgeBuilder::new(transport, framework)
        .with_config(&config.bridge)
        .build();

    let source = ConsoleSource::new(
        BufReader::new(tokio::io::stdin()),
        config.console.user()?,
        config.console.channel()?,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ctrl-C handler unavailable");
                // Keep the sender alive so the loop only stops at end of input
                std::future::pending::<()>().await;
            }
        }
    });

    tracing::info!(
        program = %config.bridge.trigger().program(),
        "Type '{} --help' to list commands",
        config.bridge.trigger().program()
    );
    bridge.run(source, shutdown_rx).await?;

    let aborted = bridge.shutdown_timeout(SHUTDOWN_GRACE).await;
    tracing::info!(aborted, "Shut down");
    Ok(())
}
