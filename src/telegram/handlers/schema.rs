//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::{
    handle_help_command, handle_start_command, handle_status_command, handle_update_cookies_command,
};
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::downloads::{handle_download_callback, handle_link_message};

/// Creates the dispatcher schema for the bot.
///
/// Commands are matched first, then plain text (links), then inline button
/// presses.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(message_handler(deps_messages))
        .branch(callback_handler(deps_callback))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);

                let result = match cmd {
                    Command::Start => handle_start_command(&bot, &msg).await,
                    Command::Help => handle_help_command(&bot, &msg).await,
                    Command::Status => handle_status_command(&bot, &msg, &deps).await,
                    Command::UpdateCookies(payload) => handle_update_cookies_command(&bot, &msg, &payload, &deps).await,
                };

                if let Err(e) = result {
                    log::error!("❌ Command handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        },
    ))
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_link_message(&bot, &msg, &deps).await {
                    log::error!("❌ Message handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            if let Err(e) = handle_download_callback(&bot, &q, &deps).await {
                log::error!("❌ Callback handler failed for user {}: {}", q.from.id, e);
            }
            Ok(())
        }
    })
}
