//! Command handler implementations (/start, /help, /status, /update_cookies)

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::Message;
use teloxide::utils::command::BotCommands;

use super::types::{sender_id, HandlerDeps, HandlerError};
use crate::core::auth::Capability;
use crate::core::config;
use crate::download::cookies::update_cookies_from_base64;
use crate::telegram::bot::Command;

const WELCOME_TEXT: &str = "👋 Hi! Send me a link to a video and I will offer the available resolutions.\n\nPick one and I will download it and send it right here.";

const ADMIN_ONLY_TEXT: &str = "⛔ This command is for admins only.";

/// Handle /start command
pub(super) async fn handle_start_command(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    bot.send_message(msg.chat.id, WELCOME_TEXT).await?;
    Ok(())
}

/// Handle /help command
pub(super) async fn handle_help_command(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    let text = format!(
        "{}\n\nFiles larger than {} cannot be sent.",
        Command::descriptions(),
        crate::download::error::format_size(config::limits::TELEGRAM_FILE_LIMIT)
    );
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle /status command (admins only)
pub(super) async fn handle_status_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = sender_id(msg) as i64;
    if !deps.auth.allows(user_id, Capability::ViewStatus) {
        bot.send_message(msg.chat.id, ADMIN_ONLY_TEXT).await?;
        return Ok(());
    }

    let pool = deps.workflow.pool();
    let text = format!(
        "📊 Status\n\nUptime: {}\nPending menu tokens: {}\nFree workers: {}/{}\nGlobal cookies: {}\nyt-dlp: {}",
        format_uptime(deps.started_at.elapsed()),
        deps.workflow.tokens().len(),
        pool.available(),
        pool.size(),
        if deps.cookies.global_available() { "✅ present" } else { "❌ missing" },
        config::YTDL_BIN.as_str(),
    );
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle /update_cookies <base64> (admins only)
pub(super) async fn handle_update_cookies_command(
    bot: &Bot,
    msg: &Message,
    payload: &str,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    let user_id = sender_id(msg) as i64;
    if !deps.auth.allows(user_id, Capability::ManageCookies) {
        bot.send_message(msg.chat.id, ADMIN_ONLY_TEXT).await?;
        return Ok(());
    }

    let payload = payload.trim();
    if payload.is_empty() {
        bot.send_message(msg.chat.id, "Usage: /update_cookies <base64 of cookies.txt>")
            .await?;
        return Ok(());
    }

    let Some(path) = deps.cookies.global_path() else {
        bot.send_message(msg.chat.id, "❌ No cookies file is configured.").await?;
        return Ok(());
    };

    let reply = match update_cookies_from_base64(path, payload).await {
        Ok(written) => {
            log::info!("Admin {} replaced cookies at {}", user_id, written.display());
            format!("✅ Cookies updated: {}", written.display())
        }
        Err(e) => {
            log::warn!("Admin {} sent unusable cookies: {}", user_id, e);
            format!("❌ Cookies were not updated: {}", e)
        }
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

pub(super) fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (days, hours, minutes) = (secs / 86_400, (secs % 86_400) / 3600, (secs % 3600) / 60);
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, secs % 60)
    }
}
