//! Delivery sink that uploads the finished file into the chat.

use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, InputFile};

use crate::core::config::limits::{CAPTION_MAX_CHARS, TELEGRAM_FILE_LIMIT};
use crate::download::traits::DeliverySink;

pub struct TelegramSink {
    bot: Bot,
    chat_id: ChatId,
    caption: String,
}

impl TelegramSink {
    /// The caption is clipped to what Telegram accepts for media.
    pub fn new(bot: Bot, chat_id: ChatId, caption: impl Into<String>) -> Self {
        Self {
            bot,
            chat_id,
            caption: clip_caption(caption.into()),
        }
    }
}

/// Shortens `caption` to at most `CAPTION_MAX_CHARS` characters, ellipsis included.
pub fn clip_caption(caption: String) -> String {
    if caption.chars().count() <= CAPTION_MAX_CHARS {
        return caption;
    }
    let mut clipped: String = caption.chars().take(CAPTION_MAX_CHARS - 1).collect();
    clipped.push('…');
    clipped
}

#[async_trait]
impl DeliverySink for TelegramSink {
    async fn deliver(&self, file: &Path, size: u64) -> Result<(), String> {
        if size > TELEGRAM_FILE_LIMIT {
            return Err(format!("{} bytes exceeds the Telegram limit", size));
        }

        if let Err(e) = self.bot.send_chat_action(self.chat_id, ChatAction::UploadVideo).await {
            log::debug!("Failed to send upload action to {}: {}", self.chat_id, e);
        }

        self.bot
            .send_video(self.chat_id, InputFile::file(file.to_path_buf()))
            .caption(self.caption.clone())
            .supports_streaming(true)
            .await
            .map(|_| ())
            .map_err(|e| {
                log::error!("send_video to {} failed: {}", self.chat_id, e);
                e.to_string()
            })
    }
}
