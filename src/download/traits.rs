//! Seams to the external collaborators of the download workflow.
//!
//! Errors cross these seams as plain strings: the workflow only reports the
//! cause to the user, it never branches on it.

use async_trait::async_trait;
use std::path::Path;

use crate::download::cookies::CredentialRef;
use crate::download::formats::VideoInfo;

/// Lists the encodings available for a URL.
#[async_trait]
pub trait FormatLister: Send + Sync {
    async fn list_formats(&self, url: &str, credential: Option<&CredentialRef>) -> Result<VideoInfo, String>;
}

/// Materializes one format of a URL as a file next to `target_prefix`.
///
/// The produced file must be named `<target_prefix>.<ext>`; the extension is
/// chosen by the downloader.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(
        &self,
        url: &str,
        format_id: &str,
        target_prefix: &Path,
        credential: Option<&CredentialRef>,
    ) -> Result<(), String>;
}

/// Transmits a finished file to the user.
///
/// The workflow has already checked `size` against its ceiling when this is
/// called.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(&self, file: &Path, size: u64) -> Result<(), String>;
}
