use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Reads an environment variable, treating blank values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    non_empty_var("BOT_TOKEN")
        .or_else(|| non_empty_var("TELOXIDE_TOKEN"))
        .unwrap_or_default()
});

/// Optional custom Bot API server (local telegram-bot-api lifts upload limits)
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| non_empty_var("BOT_API_URL"));

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| non_empty_var("YTDL_BIN").unwrap_or_else(|| "yt-dlp".to_string()));

/// Global cookies file handed to yt-dlp for authenticated sources
/// Read from COOKIES_FILE, default: cookies.txt
/// Supports tilde (~) expansion
pub static COOKIES_FILE: Lazy<PathBuf> = Lazy::new(|| {
    let raw = non_empty_var("COOKIES_FILE").unwrap_or_else(|| "cookies.txt".to_string());
    PathBuf::from(shellexpand::tilde(&raw).to_string())
});

/// Name of the variable carrying a base64-encoded cookies.txt (set on the hosting dashboard)
pub const COOKIES_ENV_VAR: &str = "COOKIES_TXT_BASE64";

/// Base64 payload used to materialize COOKIES_FILE when the file does not exist yet
pub static COOKIES_TXT_BASE64: Lazy<Option<String>> = Lazy::new(|| non_empty_var(COOKIES_ENV_VAR));

/// Directory with per-user cookie files named `<telegram user id>.txt`
/// Read from COOKIES_DIR, unset disables per-user cookies
pub static COOKIES_DIR: Lazy<Option<PathBuf>> =
    Lazy::new(|| non_empty_var("COOKIES_DIR").map(|raw| PathBuf::from(shellexpand::tilde(&raw).to_string())));

/// Root for per-request scratch directories
/// Read from TEMP_FILES_DIR, defaults to the system temp dir
pub static TEMP_FILES_DIR: Lazy<PathBuf> = Lazy::new(|| {
    non_empty_var("TEMP_FILES_DIR")
        .map(|raw| PathBuf::from(shellexpand::tilde(&raw).to_string()))
        .unwrap_or_else(env::temp_dir)
});

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: tubegrab.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| non_empty_var("LOG_FILE_PATH").unwrap_or_else(|| "tubegrab.log".to_string()));

/// Log level (error, warn, info, debug, trace)
pub static LOG_LEVEL: Lazy<String> = Lazy::new(|| non_empty_var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()));

/// Port for the health-check web server
/// PORT is what most PaaS hosts inject; WEB_PORT is the local override
pub static WEB_PORT: Lazy<u16> = Lazy::new(|| {
    non_empty_var("PORT")
        .or_else(|| non_empty_var("WEB_PORT"))
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(8080)
});

/// Public URL pinged by the keep-alive loop
pub static KEEPALIVE_URL: Lazy<Option<String>> =
    Lazy::new(|| non_empty_var("KEEPALIVE_URL").or_else(|| non_empty_var("RENDER_EXTERNAL_URL")));

/// Delivery limits
pub mod limits {
    /// Telegram Bot API hard limit for uploaded files (2 GiB)
    pub const TELEGRAM_FILE_LIMIT: u64 = 2 * 1024 * 1024 * 1024;

    /// Longest error cause shown to a user
    pub const USER_ERROR_MAX_CHARS: usize = 300;

    /// Telegram media caption limit (in characters)
    pub const CAPTION_MAX_CHARS: usize = 1024;
}

/// Download configuration
pub mod download {
    use super::Duration;

    /// Timeout for `yt-dlp -J` metadata extraction (in seconds)
    pub const EXTRACT_TIMEOUT_SECS: u64 = 120;

    /// Timeout for the download itself, merge included (in seconds)
    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 30 * 60;

    pub fn extract_timeout() -> Duration {
        Duration::from_secs(EXTRACT_TIMEOUT_SECS)
    }

    pub fn download_timeout() -> Duration {
        Duration::from_secs(DOWNLOAD_TIMEOUT_SECS)
    }
}

/// Queue / worker pool configuration
pub mod queue {
    use super::non_empty_var;
    use once_cell::sync::Lazy;

    /// Default number of concurrent extraction/download jobs
    /// Kept low to avoid YouTube 403 rate limiting
    pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 2;

    /// Read from MAX_CONCURRENT_JOBS
    pub static MAX_CONCURRENT_JOBS: Lazy<usize> = Lazy::new(|| {
        non_empty_var("MAX_CONCURRENT_JOBS")
            .and_then(|raw| raw.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_JOBS)
    });
}

/// Token store configuration
pub mod tokens {
    use super::{non_empty_var, Duration};
    use once_cell::sync::Lazy;

    /// Token length in characters (callback data must stay under 64 bytes)
    pub const TOKEN_LEN: usize = 16;

    pub const DEFAULT_TTL_SECS: u64 = 60 * 60;
    pub const DEFAULT_CAPACITY: usize = 10_000;

    /// Interval between background sweeps of expired tokens (in seconds)
    pub const SWEEP_INTERVAL_SECS: u64 = 5 * 60;

    /// Read from TOKEN_TTL_SECS
    pub static TTL: Lazy<Duration> = Lazy::new(|| {
        Duration::from_secs(
            non_empty_var("TOKEN_TTL_SECS")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_TTL_SECS),
        )
    });

    /// Read from TOKEN_STORE_CAPACITY
    pub static CAPACITY: Lazy<usize> = Lazy::new(|| {
        non_empty_var("TOKEN_STORE_CAPACITY")
            .and_then(|raw| raw.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_CAPACITY)
    });

    pub fn sweep_interval() -> Duration {
        Duration::from_secs(SWEEP_INTERVAL_SECS)
    }
}

/// Keep-alive pinger configuration
pub mod keepalive {
    use super::{non_empty_var, Duration};
    use once_cell::sync::Lazy;

    /// Default ping interval, comfortably below the 15 minute idle timer of free hosts
    pub const DEFAULT_INTERVAL_SECS: u64 = 300;

    /// Per-request timeout (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;

    /// Read from KEEPALIVE_INTERVAL_SECS
    pub static INTERVAL: Lazy<Duration> = Lazy::new(|| {
        Duration::from_secs(
            non_empty_var("KEEPALIVE_INTERVAL_SECS")
                .and_then(|raw| raw.parse().ok())
                .filter(|n: &u64| *n > 0)
                .unwrap_or(DEFAULT_INTERVAL_SECS),
        )
    });

    pub fn request_timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    /// Large because uploads of video files go through the same client
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    /// Admin user IDs (comma-separated)
    /// Read from ADMIN_IDS environment variable
    pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
        env::var("ADMIN_IDS")
            .ok()
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default()
    });
}
