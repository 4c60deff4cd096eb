use thiserror::Error;

use crate::download::error::WorkflowError;

/// Centralized error types for the application
///
/// Everything outside the download workflow converts into this enum. The
/// workflow itself reports through [`WorkflowError`], which carries the
/// user-facing taxonomy.
///
/// # Example
///
/// ```no_run
/// use tubegrab::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Download workflow errors
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// HTTP client construction and keep-alive pings
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed BOT_API_URL
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or malformed startup configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
