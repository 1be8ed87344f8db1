use std::path::PathBuf;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use stockcast_core::SnapshotHandler;
use stockcast_telegram::StockBot;
use tracing::info;

use super::{CommandStrategy, load_config, open_store};

/// Input for the Telegram bot command.
pub struct RunInput {
    pub config: Option<PathBuf>,
    /// Optional bot token (overrides config)
    pub token: Option<String>,
    /// Optional report source account (overrides config)
    pub source: Option<u64>,
}

/// Strategy for running the Telegram bot.
pub struct RunStrategy;

impl CommandStrategy for RunStrategy {
    type Input = RunInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = load_config(input.config.as_deref())?;

        if !config.telegram.enabled {
            anyhow::bail!("Telegram is not enabled in config. Set \"telegram.enabled\": true");
        }

        // Get token from input or config
        let token = if let Some(t) = input.token {
            t
        } else if !config.telegram.token.is_empty() {
            config.telegram.token.clone()
        } else {
            anyhow::bail!("Telegram bot token not configured. Set \"telegram.token\" in config");
        };

        let source = input.source.or(config.telegram.source_user_id);
        match source {
            Some(id) => info!("Watching stock reports from user {id}"),
            None => info!("Watching stock reports from any account"),
        }

        let handler = SnapshotHandler::new(open_store(&config)?, StdRng::from_entropy());
        let handler = Arc::new(tokio::sync::Mutex::new(handler));

        let bot = StockBot::new(token, handler, source, &config.telegram.allow_from);

        info!("Telegram bot is running. Press Ctrl+C to stop.");
        bot.run().await?;

        Ok(())
    }
}
