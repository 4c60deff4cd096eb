use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tubegrab")]
#[command(author, version, about = "Telegram bot that downloads videos in the resolution you pick", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (default when no command is given)
    Run,

    /// Ping a URL periodically so a free host does not idle the service
    Keepalive {
        /// URL to ping (defaults to KEEPALIVE_URL / RENDER_EXTERNAL_URL)
        #[arg(long)]
        url: Option<String>,

        /// Seconds between pings
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Print the resolution menu the bot would offer for a URL
    Formats {
        /// Video URL
        url: String,

        /// Cookies file to pass to yt-dlp
        #[arg(short, long)]
        cookies: Option<PathBuf>,
    },

    /// Check yt-dlp and cookies setup
    Check,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
