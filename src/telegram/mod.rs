//! Telegram bot integration and handlers

pub mod bot;
pub mod delivery;
pub mod downloads;
pub mod handlers;
pub mod keyboard;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_commands, Command};
pub use delivery::TelegramSink;
pub use handlers::{schema, HandlerDeps, HandlerError};
