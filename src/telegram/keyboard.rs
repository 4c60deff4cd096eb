//! Inline keyboard for the resolution menu.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::download::error::format_size;
use crate::download::formats::{Menu, MenuEntry};

/// Callback data prefix of the download buttons
pub const DOWNLOAD_PREFIX: &str = "dl:";

pub fn callback_data(token: &str) -> String {
    format!("{}{}", DOWNLOAD_PREFIX, token)
}

/// Extracts the token from `dl:<token>` callback data.
pub fn parse_callback(data: &str) -> Option<&str> {
    data.strip_prefix(DOWNLOAD_PREFIX)
        .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric()))
}

pub fn button_label(entry: &MenuEntry) -> String {
    match entry.filesize {
        Some(size) => format!("📥 {} (~{})", entry.label, format_size(size)),
        None => format!("📥 {}", entry.label),
    }
}

/// One button per menu entry, in menu order (highest resolution on top).
pub fn menu_keyboard(menu: &Menu) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = menu
        .entries
        .iter()
        .map(|entry| vec![InlineKeyboardButton::callback(button_label(entry), callback_data(&entry.token))])
        .collect();
    InlineKeyboardMarkup::new(rows)
}

pub fn menu_text(menu: &Menu) -> String {
    match &menu.title {
        Some(title) => format!("🎬 {}\n\nChoose a resolution:", title),
        None => "🎬 Choose a resolution:".to_string(),
    }
}
