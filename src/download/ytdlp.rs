//! yt-dlp backend: format listing and downloads through the `yt-dlp` binary.

use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use tokio::process::Command as TokioCommand;

use crate::core::config;
use crate::download::cookies::CredentialRef;
use crate::download::formats::{parse_video_info, VideoInfo};
use crate::download::traits::{Downloader, FormatLister};

/// Runs the yt-dlp binary.
///
/// Children are spawned with `kill_on_drop`, so a caller-side timeout that drops
/// the future also kills the process.
#[derive(Debug, Clone)]
pub struct YtDlp {
    bin: String,
}

impl YtDlp {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Binary from YTDL_BIN
    pub fn from_env() -> Self {
        Self::new(config::YTDL_BIN.clone())
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }

    async fn run(&self, args: &[String]) -> Result<Output, String> {
        log::debug!("{} {}", self.bin, args.join(" "));
        TokioCommand::new(&self.bin)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| format!("failed to run {}: {}", self.bin, e))
    }

    /// `yt-dlp --version`
    pub async fn version(&self) -> Result<String, String> {
        let output = self.run(&["--version".to_string()]).await?;
        if !output.status.success() {
            return Err(summarize_stderr(&String::from_utf8_lossy(&output.stderr)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Cookie arguments; with cookies we also stop yt-dlp from marking videos as
/// watched on the account and let it bypass geo restrictions.
fn push_cookie_args(args: &mut Vec<String>, credential: Option<&CredentialRef>) {
    if let Some(credential) = credential {
        args.push("--cookies".to_string());
        args.push(credential.path().display().to_string());
        args.push("--no-mark-watched".to_string());
        args.push("--geo-bypass".to_string());
    }
}

/// Arguments for `yt-dlp -J`.
pub fn list_formats_args(url: &str, credential: Option<&CredentialRef>) -> Vec<String> {
    let mut args: Vec<String> = ["-J", "--no-playlist", "--no-warnings"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    push_cookie_args(&mut args, credential);
    args.push("--".to_string());
    args.push(url.to_string());
    args
}

/// Arguments for downloading `format_id` (merged with the best audio) into `<target_prefix>.<ext>`.
pub fn download_args(
    url: &str,
    format_id: &str,
    target_prefix: &Path,
    credential: Option<&CredentialRef>,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        "--no-progress".to_string(),
        "-f".to_string(),
        format!("{}+bestaudio/best", format_id),
        "--merge-output-format".to_string(),
        "mp4".to_string(),
        "-o".to_string(),
        format!("{}.%(ext)s", target_prefix.display()),
    ];
    push_cookie_args(&mut args, credential);
    args.push("--".to_string());
    args.push(url.to_string());
    args
}

/// Reduces yt-dlp stderr to the line worth showing: the last `ERROR:` line,
/// or the last non-empty line.
pub fn summarize_stderr(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .rev()
        .find(|line| line.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|line| line.to_string())
        .unwrap_or_else(|| "yt-dlp exited without an error message".to_string())
}

#[async_trait]
impl FormatLister for YtDlp {
    async fn list_formats(&self, url: &str, credential: Option<&CredentialRef>) -> Result<VideoInfo, String> {
        let output = self.run(&list_formats_args(url, credential)).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!("yt-dlp -J failed for {}: {}", url, stderr.trim());
            return Err(summarize_stderr(&stderr));
        }

        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).map_err(|e| format!("unreadable yt-dlp output: {}", e))?;
        let info = parse_video_info(&json);
        log::info!(
            "yt-dlp listed {} formats for {} ({:?})",
            info.formats.len(),
            url,
            info.title
        );
        Ok(info)
    }
}

#[async_trait]
impl Downloader for YtDlp {
    async fn download(
        &self,
        url: &str,
        format_id: &str,
        target_prefix: &Path,
        credential: Option<&CredentialRef>,
    ) -> Result<(), String> {
        let output = self
            .run(&download_args(url, format_id, target_prefix, credential))
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!("yt-dlp download failed for {} [{}]: {}", url, format_id, stderr.trim());
            return Err(summarize_stderr(&stderr));
        }
        Ok(())
    }
}
