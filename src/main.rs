use anyhow::Result;
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;

use tubegrab::cli::{Cli, Commands};
use tubegrab::core::auth::AuthorizationPolicy;
use tubegrab::core::keepalive::run_keepalive;
use tubegrab::core::web_server::{start_web_server, HealthState};
use tubegrab::core::{config, init_logger, log_cookies_configuration, AppError, AppResult};
use tubegrab::download::cookies::{init_global_cookies, CookieProvider, CredentialRef};
use tubegrab::download::error::format_size;
use tubegrab::download::token_store::spawn_sweeper;
use tubegrab::download::{MemoryTokenStore, TokenStore, WorkerPool, Workflow, YtDlp};
use tubegrab::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point
///
/// Parses CLI arguments and dispatches to the appropriate subcommand.
///
/// # Errors
/// Returns an error if logging cannot start or a subcommand fails (missing token, bad BOT_API_URL, Telegram unreachable).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env before any config is read
    let _ = dotenv();

    let cli = Cli::parse_args();

    // Panics inside spawned jobs are contained; log them instead of losing them on stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    init_logger(&config::LOG_FILE_PATH, &config::LOG_LEVEL)?;

    match cli.command {
        Some(Commands::Run) | None => run_bot().await?,
        Some(Commands::Keepalive { url, interval }) => run_keepalive_command(url, interval).await?,
        Some(Commands::Formats { url, cookies }) => run_formats_command(url, cookies).await?,
        Some(Commands::Check) => run_check_command().await,
    }
    Ok(())
}

/// Runs the bot until Ctrl+C
async fn run_bot() -> AppResult<()> {
    let bot = create_bot()?;

    let cookie_status = init_global_cookies(&config::COOKIES_FILE, config::COOKIES_TXT_BASE64.as_deref()).await;
    log_cookies_configuration(&cookie_status, config::COOKIES_DIR.as_deref());
    let cookies = CookieProvider::from_status(&cookie_status, config::COOKIES_DIR.clone());

    let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::from_env());
    let pool = WorkerPool::new(*config::queue::MAX_CONCURRENT_JOBS);
    let ytdlp = Arc::new(YtDlp::from_env());
    let workflow = Arc::new(Workflow::new(
        ytdlp.clone(),
        ytdlp,
        Arc::clone(&tokens),
        pool.clone(),
    ));
    log::info!(
        "Workflow ready: {} workers, temp root {}",
        pool.size(),
        config::TEMP_FILES_DIR.display()
    );

    spawn_sweeper(Arc::clone(&tokens), config::tokens::sweep_interval());

    let health = HealthState {
        tokens,
        pool,
        cookies: cookies.clone(),
    };
    let port = *config::WEB_PORT;
    tokio::spawn(async move {
        if let Err(e) = start_web_server(port, health).await {
            log::error!("Web server error: {}", e);
        }
    });

    match config::KEEPALIVE_URL.clone() {
        Some(url) => {
            tokio::spawn(async move {
                if let Err(e) = run_keepalive(url, *config::keepalive::INTERVAL).await {
                    log::error!("Keepalive stopped: {}", e);
                }
            });
        }
        None => log::info!("Keepalive disabled (no KEEPALIVE_URL / RENDER_EXTERNAL_URL)"),
    }

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }
    let me = bot.get_me().await?;
    log::info!("Bot @{} starting (cookies: {})", me.username(), cookie_status.available());

    let auth = AuthorizationPolicy::from_env();
    if !auth.has_admins() {
        log::warn!("ADMIN_IDS is empty: /status and /update_cookies are unavailable");
    }
    let deps = HandlerDeps::new(workflow, cookies, auth);

    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();
    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Standalone keep-alive pinger
async fn run_keepalive_command(url: Option<String>, interval: Option<u64>) -> AppResult<()> {
    let url = url
        .or_else(|| config::KEEPALIVE_URL.clone())
        .ok_or_else(|| {
            AppError::Config("No URL given and neither KEEPALIVE_URL nor RENDER_EXTERNAL_URL is set".to_string())
        })?;
    let period = interval
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(*config::keepalive::INTERVAL);

    run_keepalive(url, period).await
}

/// Prints the menu the bot would offer for `url`
async fn run_formats_command(url: String, cookies: Option<PathBuf>) -> AppResult<()> {
    let ytdlp = Arc::new(YtDlp::from_env());
    let workflow = Workflow::new(
        ytdlp.clone(),
        ytdlp,
        Arc::new(MemoryTokenStore::from_env()),
        WorkerPool::new(1),
    );

    let menu = workflow.build_menu(&url, cookies.map(CredentialRef::new)).await?;

    println!("{}", menu.title.as_deref().unwrap_or("(untitled)"));
    for entry in &menu.entries {
        let size = entry.filesize.map(format_size).unwrap_or_else(|| "?".to_string());
        println!("  {:>6}  format {:<8} ~{}", entry.label, entry.format_id, size);
    }
    Ok(())
}

/// Verifies that yt-dlp runs and reports the cookies setup
async fn run_check_command() {
    let ytdlp = YtDlp::from_env();
    match ytdlp.version().await {
        Ok(version) => println!("✅ {} {}", ytdlp.bin(), version),
        Err(e) => println!("❌ {}: {}", ytdlp.bin(), e),
    }

    let status = init_global_cookies(&config::COOKIES_FILE, config::COOKIES_TXT_BASE64.as_deref()).await;
    log_cookies_configuration(&status, config::COOKIES_DIR.as_deref());
    println!(
        "{} cookies: {} ({:?})",
        if status.available() { "✅" } else { "⚠️" },
        status.path.display(),
        status.source
    );
    println!(
        "{} BOT_TOKEN",
        if config::BOT_TOKEN.is_empty() { "❌ missing" } else { "✅ set" }
    );
}
