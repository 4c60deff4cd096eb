//! Tubegrab - Telegram bot that downloads videos in a chosen resolution
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, health server and keep-alive
//! - `download`: format ranking, menu tokens, worker pool and the download workflow
//! - `telegram`: Telegram bot integration and handlers
//! - `cli`: command line interface

pub mod cli;
pub mod core;
pub mod download;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use download::{Workflow, WorkflowError};
pub use telegram::{create_bot, schema, HandlerDeps};
