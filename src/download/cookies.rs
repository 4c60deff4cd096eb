//! Cookie-file provisioning for authenticated video sources
//!
//! - Materialize the global cookies file from a base64 environment variable
//! - Pick a per-user or global cookies file for a request
//! - Replace the global cookies file from an admin command

use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Serializes writers of the global cookies file
static COOKIES_WRITE_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Opaque reference to a credential bundle (a Netscape cookies file) passed
/// through to the downloader untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CredentialRef(PathBuf);

impl CredentialRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Where the global cookies file came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieSource {
    ExistingFile,
    DecodedFromEnv,
    Missing,
}

#[derive(Debug, Clone)]
pub struct CookieStatus {
    pub path: PathBuf,
    pub source: CookieSource,
}

impl CookieStatus {
    pub fn available(&self) -> bool {
        self.source != CookieSource::Missing
    }
}

/// Prepares the global cookies file.
///
/// An existing file wins. Otherwise the base64 payload (if any) is decoded and
/// written. Decoding or write failures are logged and leave the bot running
/// without cookies.
pub async fn init_global_cookies(path: &Path, cookies_b64: Option<&str>) -> CookieStatus {
    if path.exists() {
        return CookieStatus {
            path: path.to_path_buf(),
            source: CookieSource::ExistingFile,
        };
    }

    let source = match cookies_b64 {
        None => CookieSource::Missing,
        Some(payload) => match update_cookies_from_base64(path, payload).await {
            Ok(_) => CookieSource::DecodedFromEnv,
            Err(e) => {
                log::error!("Failed to create {}: {}", path.display(), e);
                CookieSource::Missing
            }
        },
    };

    CookieStatus {
        path: path.to_path_buf(),
        source,
    }
}

/// Checks that the content looks like a Netscape cookies file.
pub fn looks_like_cookies_file(content: &str) -> bool {
    if content.contains("# Netscape HTTP Cookie File") || content.contains("# HTTP Cookie File") {
        return true;
    }
    content
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .any(|line| line.split('\t').count() >= 7)
}

/// Decodes base64 cookies content and writes it atomically to `path`.
pub async fn update_cookies_from_base64(path: &Path, cookies_b64: &str) -> Result<PathBuf> {
    let decoded = general_purpose::STANDARD
        .decode(cookies_b64.trim())
        .map_err(|e| anyhow::anyhow!("Invalid base64: {}", e))?;

    let content = String::from_utf8(decoded).map_err(|e| anyhow::anyhow!("Invalid UTF-8 in cookies: {}", e))?;

    update_cookies_from_content(path, &content).await
}

/// Writes cookies content atomically (temp file + rename).
pub async fn update_cookies_from_content(path: &Path, content: &str) -> Result<PathBuf> {
    if !looks_like_cookies_file(content) {
        return Err(anyhow::anyhow!(
            "Invalid cookies format. Expected Netscape HTTP Cookie File format"
        ));
    }

    let _lock = COOKIES_WRITE_MUTEX.lock().await;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create cookies directory: {}", e))?;
    }

    let temp_path = PathBuf::from(format!("{}.tmp.{}", path.display(), std::process::id()));

    tokio::fs::write(&temp_path, content)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to write temp cookies file: {}", e))?;

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(anyhow::anyhow!("Failed to rename cookies file: {}", e));
    }

    log::info!("✅ Cookies file updated atomically: {}", path.display());

    Ok(path.to_path_buf())
}

/// Chooses the credential bundle for a chat user.
#[derive(Debug, Clone, Default)]
pub struct CookieProvider {
    global: Option<PathBuf>,
    user_dir: Option<PathBuf>,
}

impl CookieProvider {
    pub fn new(global: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self { global, user_dir }
    }

    /// Provider backed by the startup status and COOKIES_DIR.
    ///
    /// The global path is kept even when the file is missing: an admin may
    /// upload it later, and lookups check the file on every call.
    pub fn from_status(status: &CookieStatus, user_dir: Option<PathBuf>) -> Self {
        Self::new(Some(status.path.clone()), user_dir)
    }

    /// Per-user `<user_dir>/<user_id>.txt` wins over the global file.
    pub fn credential_for(&self, user_id: u64) -> Option<CredentialRef> {
        if let Some(dir) = &self.user_dir {
            let candidate = dir.join(format!("{}.txt", user_id));
            if candidate.is_file() {
                return Some(CredentialRef::new(candidate));
            }
        }
        self.global
            .as_ref()
            .filter(|path| path.is_file())
            .map(|path| CredentialRef::new(path.clone()))
    }

    pub fn global_path(&self) -> Option<&Path> {
        self.global.as_deref()
    }

    /// Whether the global cookies file currently exists
    pub fn global_available(&self) -> bool {
        self.global.as_ref().is_some_and(|path| path.is_file())
    }
}
