//! Bot initialization
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command registration in the Telegram UI

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;
use crate::core::error::{AppError, AppResult};

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Send me a video link and pick a resolution. Commands:")]
pub enum Command {
    #[command(description = "welcome message")]
    Start,
    #[command(description = "how to use the bot")]
    Help,
    #[command(description = "bot status (admins only)")]
    Status,
    #[command(rename = "update_cookies", description = "replace cookies.txt with a base64 payload (admins only)")]
    UpdateCookies(String),
}

/// Creates a Bot instance with custom or default API URL
///
/// A local Bot API server (BOT_API_URL) is what lifts the upload limit from
/// 50 MB to 2 GB.
pub fn create_bot() -> AppResult<Bot> {
    let token = require_token(&config::BOT_TOKEN)?;
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token, client);

    match config::BOT_API_URL.as_deref() {
        Some(raw) => {
            log::info!("Using custom Bot API URL: {}", raw);
            Ok(bot.set_api_url(url::Url::parse(raw)?))
        }
        None => Ok(bot),
    }
}

/// The bot cannot start without a token.
fn require_token(token: &str) -> AppResult<&str> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Config("BOT_TOKEN environment variable is not set".to_string()));
    }
    Ok(token)
}

/// Sets up bot commands in Telegram UI (admin commands stay hidden)
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    use teloxide::types::BotCommand;

    bot.set_my_commands(vec![
        BotCommand::new("start", "welcome message"),
        BotCommand::new("help", "how to use the bot"),
    ])
    .await?;

    Ok(())
}
