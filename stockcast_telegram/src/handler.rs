use crate::{Command, Error, Result, StockBot};
use teloxide::{requests::Requester, types::Message};
use tracing::{debug, info, warn};

/// Handle bot commands
pub async fn handle_command(bot: StockBot, msg: Message, cmd: Command) -> Result<()> {
    let username = msg
        .from
        .as_ref()
        .and_then(|u| u.username.as_deref())
        .unwrap_or("unknown");

    match cmd {
        Command::Start => {
            info!("[@{username}] Command: /start");
            bot.bot
                .send_message(msg.chat.id, Command::welcome_text())
                .await?;
        }
        Command::Help => {
            info!("[@{username}] Command: /help");
            bot.bot
                .send_message(msg.chat.id, Command::help_text())
                .await?;
        }
        Command::Top(category) => {
            info!("[@{username}] Command: /top {}", category.as_deref().unwrap_or(""));
            let reply = bot.top(category.as_deref()).await?;
            bot.bot.send_message(msg.chat.id, reply).await?;
        }
    }

    Ok(())
}

/// Handle any message (commands or stock reports)
pub async fn handle_message(bot: StockBot, msg: Message) -> Result<()> {
    let chat_id = msg.chat.id.0;
    if !bot.is_allowed(chat_id) {
        warn!("{}", Error::Unauthorized(chat_id));
        return Ok(());
    }

    let Some(text) = msg.text().or_else(|| msg.caption()) else {
        return Ok(());
    };

    // Check if this is a command
    if let Some(cmd) = Command::parse_from_text(text) {
        return handle_command(bot, msg, cmd).await;
    }

    if !bot.is_source(msg.from.as_ref()) {
        debug!("Ignoring message from non-source account in chat {chat_id}");
        return Ok(());
    }

    let Some(reply) = bot.process_report(text).await? else {
        return Ok(());
    };

    info!("Forecast for chat {chat_id}:\n{reply}");
    bot.bot.send_message(msg.chat.id, reply).await?;

    Ok(())
}
