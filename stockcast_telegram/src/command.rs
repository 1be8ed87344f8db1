use teloxide::types::BotCommand;

/// Number of items listed by `/top`.
pub const TOP_LIMIT: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// Heaviest items of a category; the first configured one when omitted
    Top(Option<String>),
}

impl Command {
    fn all() -> Vec<BotCommand> {
        vec![
            BotCommand {
                command: "start".to_string(),
                description: "Start the bot".to_string(),
            },
            BotCommand {
                command: "help".to_string(),
                description: "Show help".to_string(),
            },
            BotCommand {
                command: "top".to_string(),
                description: "Most frequently seen items of a category".to_string(),
            },
        ]
    }

    #[must_use]
    pub fn bot_commands() -> Vec<BotCommand> {
        Self::all()
    }

    #[must_use]
    pub fn parse_from_text(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.to_lowercase();

        // Remove bot mention if present (e.g., "/top@my_bot")
        let head = head.split('@').next().unwrap_or(&head);

        match head {
            "/start" => Some(Self::Start),
            "/help" => Some(Self::Help),
            "/top" => Some(Self::Top(parts.next().map(str::to_lowercase))),
            _ => None,
        }
    }

    #[must_use]
    pub const fn help_text() -> &'static str {
        r"
📈 Stockcast Bot

Commands:
/start - Start the bot
/help  - Show this help
/top [category] - Most frequently seen items

Post a stock report and I will guess the next one.
"
    }

    #[must_use]
    pub const fn welcome_text() -> &'static str {
        r"
👋 Welcome to Stockcast!

I learn which items keep showing up in stock reports and
predict what the next restock will bring.

Send /help to see the commands.
"
    }
}
