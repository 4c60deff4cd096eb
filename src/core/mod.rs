//! Core utilities, configuration, and common functionality

pub mod auth;
pub mod config;
pub mod error;
pub mod keepalive;
pub mod logging;
pub mod web_server;

// Re-exports for convenience
pub use error::{AppError, AppResult};
pub use logging::{init_logger, log_cookies_configuration};
