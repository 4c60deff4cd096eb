//! Link messages and resolution button presses.
//!
//! Both entry points hand the slow part (extraction, download, upload) to a
//! spawned task so the dispatcher keeps serving other updates.

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{Message, MessageId};

use crate::download::error::format_size;
use crate::download::PendingRequest;
use crate::telegram::delivery::TelegramSink;
use crate::telegram::handlers::{sender_id, HandlerDeps, HandlerError};
use crate::telegram::keyboard::{menu_keyboard, menu_text, parse_callback};

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("URL regex is valid"));

const NO_LINK_TEXT: &str = "Send me a link to a video (starting with http:// or https://).";

/// First http(s) URL in `text` that parses as a URL.
pub fn extract_url(text: &str) -> Option<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|candidate| url::Url::parse(candidate).is_ok())
        .map(str::to_string)
}

/// Whether a message without a link earns a usage hint.
///
/// Groups see plenty of ordinary chatter, so the hint is for private chats only.
fn wants_link_hint(chat_id: ChatId) -> bool {
    chat_id.is_user()
}

/// Replies to a text message with the resolution menu of the link it contains.
pub async fn handle_link_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let Some(url) = extract_url(text) else {
        if wants_link_hint(msg.chat.id) {
            bot.send_message(msg.chat.id, NO_LINK_TEXT).await?;
        }
        return Ok(());
    };

    let user_id = sender_id(msg);
    let credential = deps.cookies.credential_for(user_id);
    log::info!(
        "Link from user {} in chat {}: {} (cookies: {})",
        user_id,
        msg.chat.id,
        url,
        credential.is_some()
    );

    let status = bot
        .send_message(msg.chat.id, "🔍 Looking up available formats…")
        .await?;

    let bot = bot.clone();
    let chat_id = msg.chat.id;
    let workflow = Arc::clone(&deps.workflow);
    tokio::spawn(async move {
        let outcome = workflow.build_menu(&url, credential).await;
        let sent = match outcome {
            Ok(menu) => {
                bot.edit_message_text(chat_id, status.id, menu_text(&menu))
                    .reply_markup(menu_keyboard(&menu))
                    .await
            }
            Err(e) => bot.edit_message_text(chat_id, status.id, e.user_message()).await,
        };
        if let Err(e) = sent {
            log::error!("Failed to show menu in chat {}: {}", chat_id, e);
        }
    });

    Ok(())
}

/// Where progress and the outcome of a download are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusTarget {
    /// The menu message, edited in place.
    Edit(ChatId, MessageId),
    /// The presser's private chat, when the menu message is not available.
    Send(ChatId),
}

impl StatusTarget {
    fn for_callback(q: &CallbackQuery) -> Self {
        match q.message.as_ref() {
            Some(m) => StatusTarget::Edit(m.chat().id, m.id()),
            None => StatusTarget::Send(ChatId::from(q.from.id)),
        }
    }

    /// Chat the file is uploaded into.
    fn chat_id(self) -> ChatId {
        match self {
            StatusTarget::Edit(chat_id, _) | StatusTarget::Send(chat_id) => chat_id,
        }
    }

    async fn show(self, bot: &Bot, text: String) {
        let result = match self {
            StatusTarget::Edit(chat_id, message_id) => bot.edit_message_text(chat_id, message_id, text).await.map(|_| ()),
            StatusTarget::Send(chat_id) => bot.send_message(chat_id, text).await.map(|_| ()),
        };
        if let Err(e) = result {
            log::warn!("Failed to report status in chat {}: {}", self.chat_id(), e);
        }
    }
}

/// Handles a press on a `dl:<token>` button.
///
/// Once the token is taken the request exists nowhere else, so Telegram
/// failures after that point are logged and the download goes ahead.
pub async fn handle_download_callback(bot: &Bot, q: &CallbackQuery, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(token) = q.data.as_deref().and_then(parse_callback) else {
        log::debug!("Ignoring callback with data {:?}", q.data);
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let request = match deps.workflow.resolve(token) {
        Ok(request) => request,
        Err(e) => {
            log::info!("User {} pressed a stale button: {}", q.from.id, e);
            bot.answer_callback_query(q.id.clone())
                .text(e.user_message())
                .show_alert(true)
                .await?;
            return Ok(());
        }
    };

    if let Err(e) = bot
        .answer_callback_query(q.id.clone())
        .text(format!("⏬ {}", request.label))
        .await
    {
        log::warn!("Failed to answer callback for token {} from user {}: {}", token, q.from.id, e);
    }

    let target = StatusTarget::for_callback(q);
    if let StatusTarget::Send(chat_id) = target {
        log::warn!("Callback {} has no menu message, reporting to chat {}", token, chat_id);
    }

    // Editing without reply_markup drops the keyboard, so the menu cannot be reused.
    target
        .show(bot, format!("⏬ Downloading {}…", request.label))
        .await;

    spawn_delivery(bot.clone(), target, request, deps);
    Ok(())
}

fn spawn_delivery(bot: Bot, target: StatusTarget, request: PendingRequest, deps: &HandlerDeps) {
    let workflow = Arc::clone(&deps.workflow);
    tokio::spawn(async move {
        let sink = TelegramSink::new(
            bot.clone(),
            target.chat_id(),
            format!("{} • {}", request.label, request.source_url),
        );
        let text = match workflow.download_and_deliver(&request, &sink).await {
            Ok(delivered) => format!("✅ Sent {} ({})", request.label, format_size(delivered.size)),
            Err(e) => e.user_message(),
        };
        target.show(&bot, text).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_url_from_text() {
        assert_eq!(
            extract_url("look at this https://youtu.be/abc?t=3 please"),
            Some("https://youtu.be/abc?t=3".to_string())
        );
        assert_eq!(extract_url("http://example.com/v"), Some("http://example.com/v".to_string()));
    }

    #[test]
    fn test_extract_url_first_link_wins() {
        assert_eq!(
            extract_url("https://a.example/1 https://b.example/2"),
            Some("https://a.example/1".to_string())
        );
    }

    #[test]
    fn test_extract_url_none() {
        assert_eq!(extract_url("no links here"), None);
        assert_eq!(extract_url("ftp://example.com/file"), None);
        assert_eq!(extract_url("https://"), None);
    }

    #[test]
    fn test_link_hint_only_in_private_chats() {
        assert!(wants_link_hint(ChatId(42)));
        assert!(!wants_link_hint(ChatId(-4_000_000_001)));
        assert!(!wants_link_hint(ChatId(-1_001_234_567_890)));
    }

    #[test]
    fn test_callback_without_message_reports_to_presser() {
        let q: CallbackQuery = serde_json::from_value(serde_json::json!({
            "id": "4382bfdwdsb323b2d9",
            "from": { "id": 42, "is_bot": false, "first_name": "Ann" },
            "chat_instance": "-7328213761736274312",
            "data": "dl:0123456789abcdef"
        }))
        .expect("callback query JSON");

        let target = StatusTarget::for_callback(&q);
        assert_eq!(target, StatusTarget::Send(ChatId(42)));
        assert_eq!(target.chat_id(), ChatId(42));
    }

    #[test]
    fn test_menu_message_target_uploads_into_its_chat() {
        let target = StatusTarget::Edit(ChatId(-1_001_234_567_890), MessageId(7));
        assert_eq!(target.chat_id(), ChatId(-1_001_234_567_890));
    }
}
