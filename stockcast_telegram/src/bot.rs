use crate::command::{Command, TOP_LIMIT};
use crate::{Result, format};
use rand::rngs::StdRng;
use std::{sync::Arc, time::Duration};
use stockcast_core::{JsonFileBackend, Snapshot, SnapshotHandler};
use teloxide::prelude::*;
use teloxide::types::User;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Snapshot handler shared by every update; the mutex serializes snapshots.
pub type SharedHandler = Arc<tokio::sync::Mutex<SnapshotHandler<JsonFileBackend, StdRng>>>;

/// Telegram bot that learns from stock reports
#[derive(Clone)]
pub struct StockBot {
    /// Teloxide bot instance
    pub bot: Bot,
    /// Learn-then-predict engine
    handler: SharedHandler,
    /// Account whose posts count as reports
    source_user_id: Option<u64>,
    /// Allowed chat IDs
    allowed_chats: Vec<i64>,
}

impl StockBot {
    /// Create a new Telegram bot
    #[must_use]
    pub fn new(
        token: String,
        handler: SharedHandler,
        source_user_id: Option<u64>,
        allowed_chats: &[String],
    ) -> Self {
        // Parse allowed chat IDs
        let allowed_chats = allowed_chats
            .iter()
            .filter_map(|s| s.parse::<i64>().ok())
            .collect();

        Self {
            bot: Bot::new(token),
            handler,
            source_user_id,
            allowed_chats,
        }
    }

    /// Check if a chat is allowed
    #[must_use]
    pub fn is_allowed(&self, chat_id: i64) -> bool {
        self.allowed_chats.is_empty() || self.allowed_chats.contains(&chat_id)
    }

    /// Check if a message author is the configured report source
    #[must_use]
    pub fn is_source(&self, author: Option<&User>) -> bool {
        match self.source_user_id {
            None => true,
            Some(id) => author.is_some_and(|user| user.id.0 == id),
        }
    }

    /// Learn from a posted report and render the forecast.
    ///
    /// Returns `None` when the text holds no recognizable report or there is
    /// nothing to predict yet.
    pub async fn process_report(&self, text: &str) -> Result<Option<String>> {
        let mut handler = self.handler.lock().await;

        let snapshot = Snapshot::parse(text, &handler.categories());
        if snapshot.is_empty() {
            debug!("Message holds no stock report");
            return Ok(None);
        }

        let forecast = handler.process(&snapshot)?;
        if forecast.is_empty() {
            info!("Report learned, not enough history to predict yet");
            return Ok(None);
        }

        Ok(Some(format::render_forecast(&forecast)))
    }

    /// Render the heaviest items of `category`, or of the first configured one.
    pub async fn top(&self, category: Option<&str>) -> Result<String> {
        let handler = self.handler.lock().await;
        let categories = handler.categories();

        let category = match category {
            Some(c) => c.to_string(),
            None => categories.first().cloned().unwrap_or_default(),
        };

        if !handler.store().has_category(&category) {
            let options: Vec<String> = categories.iter().map(|c| format!("/top {c}")).collect();
            return Ok(format!("Use: {}", options.join("  or  ")));
        }

        let items = handler.store().top(&category, TOP_LIMIT)?;
        Ok(format::render_top(&category, &items))
    }

    /// Test connection to Telegram API with linear backoff retry.
    /// Starts at 2s, increases by 2s each attempt, max 10s delay.
    /// Retries indefinitely until connection succeeds.
    async fn test_connection(&self) -> Result<()> {
        const INITIAL_DELAY_SECS: u64 = 2;
        const MAX_DELAY_SECS: u64 = 10;

        let mut attempt = 1u64;
        loop {
            match self.bot.get_me().await {
                Ok(bot_user) => {
                    info!(
                        "Connected to Telegram API: @{} (id: {})",
                        bot_user
                            .user
                            .username
                            .unwrap_or_else(|| "no username".to_string()),
                        bot_user.user.id
                    );
                    return Ok(());
                }
                Err(e) => {
                    let delay_secs = (INITIAL_DELAY_SECS * attempt).min(MAX_DELAY_SECS);

                    warn!("Connection attempt {attempt} failed: {e}. Retrying in {delay_secs}s...");

                    // Only show detailed help on first failure
                    if attempt == 1 {
                        warn!("This may be due to:");
                        warn!("  - Network connectivity issues");
                        warn!("  - Firewall blocking api.telegram.org");
                        warn!("  - Invalid bot token");
                        warn!("  - Proxy or VPN configuration required");
                    }

                    sleep(Duration::from_secs(delay_secs)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Run the bot
    pub async fn run(self) -> Result<()> {
        use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
        use teloxide::dptree;
        use teloxide::types::Update;

        self.test_connection().await?;

        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!("Failed to register bot commands: {e}");
        }

        let bot = self.bot.clone();

        let schema = dptree::entry().branch(Update::filter_message().endpoint({
            let bot_clone = self.clone();
            move |_bot: Bot, msg: teloxide::types::Message| {
                let bot_clone = bot_clone.clone();
                async move { crate::handler::handle_message(bot_clone, msg).await }
            }
        }));

        Dispatcher::builder(bot, schema)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
