//! Mock downloader
//!
//! Simulates the ways a real download ends: a finished file, a partial file
//! followed by an error, a "success" that produced nothing, a hang, or a panic.

#![allow(dead_code)]

use async_trait::async_trait;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

use tubegrab::download::cookies::CredentialRef;
use tubegrab::download::Downloader;

#[derive(Debug, Clone)]
pub enum MockDownloadBehavior {
    /// Writes `<prefix>.<ext>` of `size` bytes and succeeds
    WriteFile { ext: &'static str, size: u64 },
    /// Leaves `<prefix>.mp4.part` behind and fails
    PartialThenFail { size: u64 },
    /// Reports success without writing anything
    SucceedWithoutFile,
    /// Fails immediately
    Fail(String),
    /// Never finishes on its own
    Hang,
    Panic,
}

/// One recorded call
#[derive(Debug, Clone)]
pub struct DownloadCall {
    pub url: String,
    pub format_id: String,
    pub target_prefix: PathBuf,
    pub credential: Option<CredentialRef>,
}

pub struct MockDownloader {
    behavior: MockDownloadBehavior,
    delay: Duration,
    calls: Mutex<Vec<DownloadCall>>,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl MockDownloader {
    pub fn new(behavior: MockDownloadBehavior) -> Self {
        Self {
            behavior,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            running: AtomicUsize::new(0),
            max_running: AtomicUsize::new(0),
        }
    }

    pub fn writing(size: u64) -> Self {
        Self::new(MockDownloadBehavior::WriteFile { ext: "mp4", size })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<DownloadCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of downloads that were in flight at the same time
    pub fn max_concurrent(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    fn write_sparse(path: &Path, size: u64) -> Result<(), String> {
        let file = File::create(path).map_err(|e| e.to_string())?;
        file.set_len(size).map_err(|e| e.to_string())
    }

    async fn perform(&self, target_prefix: &Path) -> Result<(), String> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match &self.behavior {
            MockDownloadBehavior::WriteFile { ext, size } => {
                Self::write_sparse(&target_prefix.with_extension(ext), *size)
            }
            MockDownloadBehavior::PartialThenFail { size } => {
                Self::write_sparse(&target_prefix.with_extension("mp4.part"), *size)?;
                Err("ERROR: unable to download video data: HTTP Error 403: Forbidden".to_string())
            }
            MockDownloadBehavior::SucceedWithoutFile => Ok(()),
            MockDownloadBehavior::Fail(cause) => Err(cause.clone()),
            MockDownloadBehavior::Hang => {
                sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
            MockDownloadBehavior::Panic => panic!("mock downloader exploded"),
        }
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    async fn download(
        &self,
        url: &str,
        format_id: &str,
        target_prefix: &Path,
        credential: Option<&CredentialRef>,
    ) -> Result<(), String> {
        self.calls.lock().unwrap().push(DownloadCall {
            url: url.to_string(),
            format_id: format_id.to_string(),
            target_prefix: target_prefix.to_path_buf(),
            credential: credential.cloned(),
        });

        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
        let result = self.perform(target_prefix).await;
        self.running.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
