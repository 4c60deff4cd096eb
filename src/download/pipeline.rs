//! The download workflow: URL → menu → token → download → delivery.
//!
//! [`Workflow`] owns the collaborators and the token store; the Telegram layer
//! only feeds it inbound events and renders its results.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, timeout_at, Instant};

use crate::core::config;
use crate::download::cookies::CredentialRef;
use crate::download::error::WorkflowError;
use crate::download::formats::{self, Menu};
use crate::download::pool::WorkerPool;
use crate::download::token_store::{resolve_token, PendingRequest, TokenStore};
use crate::download::traits::{DeliverySink, Downloader, FormatLister};

/// Size ceiling and step timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowLimits {
    pub max_file_size: u64,
    pub extract_timeout: Duration,
    pub download_timeout: Duration,
    pub delivery_timeout: Duration,
}

impl Default for WorkflowLimits {
    fn default() -> Self {
        Self {
            max_file_size: config::limits::TELEGRAM_FILE_LIMIT,
            extract_timeout: config::download::extract_timeout(),
            download_timeout: config::download::download_timeout(),
            delivery_timeout: config::network::timeout(),
        }
    }
}

/// Outcome of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub file_name: String,
    pub size: u64,
}

pub struct Workflow {
    lister: Arc<dyn FormatLister>,
    downloader: Arc<dyn Downloader>,
    tokens: Arc<dyn TokenStore>,
    pool: WorkerPool,
    temp_root: PathBuf,
    limits: WorkflowLimits,
}

impl Workflow {
    pub fn new(
        lister: Arc<dyn FormatLister>,
        downloader: Arc<dyn Downloader>,
        tokens: Arc<dyn TokenStore>,
        pool: WorkerPool,
    ) -> Self {
        Self {
            lister,
            downloader,
            tokens,
            pool,
            temp_root: config::TEMP_FILES_DIR.clone(),
            limits: WorkflowLimits::default(),
        }
    }

    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = temp_root.into();
        self
    }

    pub fn with_limits(mut self, limits: WorkflowLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn limits(&self) -> &WorkflowLimits {
        &self.limits
    }

    /// Extracts the format list and builds the tokenized resolution menu.
    pub async fn build_menu(&self, url: &str, credential: Option<CredentialRef>) -> Result<Menu, WorkflowError> {
        let lister = Arc::clone(&self.lister);
        let job_url = url.to_string();
        let job_credential = credential.clone();
        let extract_timeout = self.limits.extract_timeout;

        // One deadline for both the wait for a free worker and the extraction.
        let deadline = Instant::now() + extract_timeout;
        let job = async move { timeout_at(deadline, lister.list_formats(&job_url, job_credential.as_ref())).await };

        let info = match timeout_at(deadline, self.pool.run(job)).await {
            Ok(Ok(Ok(Ok(info)))) => info,
            Ok(Ok(Ok(Err(cause)))) => return Err(WorkflowError::ExtractionFailed(cause)),
            Ok(Ok(Err(_))) | Err(_) => {
                log::warn!("Extraction timed out for {}", url);
                return Err(WorkflowError::ExtractionFailed(format!(
                    "timed out after {}s",
                    extract_timeout.as_secs()
                )));
            }
            Ok(Err(e)) => return Err(WorkflowError::ExtractionFailed(e.to_string())),
        };

        formats::build_menu(url, credential, &info, self.tokens.as_ref())
    }

    /// Consumes a menu token.
    pub fn resolve(&self, token: &str) -> Result<PendingRequest, WorkflowError> {
        resolve_token(self.tokens.as_ref(), token)
    }

    /// Downloads the chosen format into a private scratch directory and hands
    /// it to `sink`. The directory is removed on every exit path.
    pub async fn download_and_deliver(
        &self,
        request: &PendingRequest,
        sink: &dyn DeliverySink,
    ) -> Result<Delivered, WorkflowError> {
        std::fs::create_dir_all(&self.temp_root)
            .map_err(|e| WorkflowError::DownloadFailed(format!("cannot create temp root: {}", e)))?;
        let workdir = tempfile::Builder::new()
            .prefix("tubegrab-")
            .tempdir_in(&self.temp_root)
            .map_err(|e| WorkflowError::DownloadFailed(format!("cannot create working directory: {}", e)))?;

        let result = self.run_in(workdir.path(), request, sink).await;

        let dir_display = workdir.path().display().to_string();
        if let Err(e) = workdir.close() {
            log::warn!("Failed to remove working directory {}: {}", dir_display, e);
        }

        match &result {
            Ok(delivered) => log::info!(
                "Delivered {} ({} bytes) for token {}",
                delivered.file_name,
                delivered.size,
                request.token
            ),
            Err(e) => log::warn!("Request {} failed [{}]: {}", request.token, e.subcategory(), e),
        }
        result
    }

    async fn run_in(
        &self,
        dir: &Path,
        request: &PendingRequest,
        sink: &dyn DeliverySink,
    ) -> Result<Delivered, WorkflowError> {
        let prefix = dir.join(&request.token);

        let downloader = Arc::clone(&self.downloader);
        let url = request.source_url.clone();
        let format_id = request.format_id.clone();
        let credential = request.credential_ref.clone();
        let job_prefix = prefix.clone();
        let download_timeout = self.limits.download_timeout;

        log::info!(
            "Downloading {} [{} / {}] into {}",
            request.source_url,
            request.label,
            request.format_id,
            dir.display()
        );

        let job = async move {
            timeout(
                download_timeout,
                downloader.download(&url, &format_id, &job_prefix, credential.as_ref()),
            )
            .await
        };

        match self.pool.run(job).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(cause))) => return Err(WorkflowError::DownloadFailed(cause)),
            Ok(Err(_)) => {
                return Err(WorkflowError::DownloadFailed(format!(
                    "timed out after {}s",
                    download_timeout.as_secs()
                )))
            }
            Err(e) => return Err(WorkflowError::DownloadFailed(e.to_string())),
        }

        let artifact = find_artifact(&prefix).ok_or_else(|| {
            WorkflowError::DownloadFailed("downloader reported success but produced no file".to_string())
        })?;

        let size = std::fs::metadata(&artifact)
            .map_err(|e| WorkflowError::DownloadFailed(format!("cannot stat downloaded file: {}", e)))?
            .len();

        if size > self.limits.max_file_size {
            return Err(WorkflowError::FileTooLarge {
                size,
                limit: self.limits.max_file_size,
            });
        }

        match timeout(self.limits.delivery_timeout, sink.deliver(&artifact, size)).await {
            Ok(Ok(())) => {}
            Ok(Err(cause)) => return Err(WorkflowError::DeliveryFailed(cause)),
            Err(_) => {
                return Err(WorkflowError::DeliveryFailed(format!(
                    "timed out after {}s",
                    self.limits.delivery_timeout.as_secs()
                )))
            }
        }

        Ok(Delivered {
            file_name: artifact
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size,
        })
    }
}

/// Finds the file the downloader produced for `prefix`: a regular file in the
/// same directory whose stem equals the prefix file name. Partial files
/// (`<prefix>.mp4.part`) do not match.
pub fn find_artifact(prefix: &Path) -> Option<PathBuf> {
    let dir = prefix.parent()?;
    let wanted = prefix.file_name()?;

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.file_stem() == Some(wanted))
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}
