//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Cookies configuration logging at startup

use anyhow::Result;
use simplelog::*;
use std::fs::File;
use std::path::Path;

use crate::download::cookies::{CookieSource, CookieStatus};

/// Parses a textual level, falling back to `Info` for anything unknown.
pub fn parse_level(raw: &str) -> LevelFilter {
    raw.trim().parse::<LevelFilter>().unwrap_or(LevelFilter::Info)
}

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
/// * `level` - Textual level (error, warn, info, debug, trace)
pub fn init_logger(log_file_path: &str, level: &str) -> Result<()> {
    let level = parse_level(level);
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the cookies configuration at application startup
pub fn log_cookies_configuration(status: &CookieStatus, user_dir: Option<&Path>) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🍪 Cookies Configuration Check");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match status.source {
        CookieSource::ExistingFile => {
            log::info!("✅ Using existing cookies file: {}", status.path.display());
        }
        CookieSource::DecodedFromEnv => {
            log::info!(
                "✅ Cookies file {} created from {}",
                status.path.display(),
                crate::core::config::COOKIES_ENV_VAR
            );
        }
        CookieSource::Missing => {
            log::warn!("⚠️  No cookies provided - some videos may not download");
            log::warn!(
                "   Put a Netscape cookies file at {} or set {} to its base64 encoding",
                status.path.display(),
                crate::core::config::COOKIES_ENV_VAR
            );
        }
    }

    match user_dir {
        Some(dir) if dir.is_dir() => log::info!("✅ Per-user cookies directory: {}", dir.display()),
        Some(dir) => log::warn!("⚠️  COOKIES_DIR {} does not exist, per-user cookies disabled", dir.display()),
        None => log::info!("   Per-user cookies: not configured"),
    }
}
