//! Builders for a workflow wired to mocks inside a private temp root

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use tubegrab::download::{
    Downloader, FormatEntry, FormatLister, MemoryTokenStore, TokenStore, WorkerPool, Workflow, WorkflowLimits,
};

/// Limits small enough for tests to hit every boundary quickly
pub fn fast_limits(max_file_size: u64) -> WorkflowLimits {
    WorkflowLimits {
        max_file_size,
        extract_timeout: Duration::from_secs(5),
        download_timeout: Duration::from_secs(5),
        delivery_timeout: Duration::from_secs(5),
    }
}

/// 1080/a, 720/b, 720/c, height 0/d
pub fn sample_formats() -> Vec<FormatEntry> {
    vec![
        FormatEntry::new("a", Some(1080), true),
        FormatEntry::new("b", Some(720), true),
        FormatEntry::new("c", Some(720), true),
        FormatEntry::new("d", Some(0), true),
    ]
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).map(|mut it| it.next().is_none()).unwrap_or(true)
}

/// Workflow plus the temp root it works in; the root is removed on drop.
pub struct TestWorkflow {
    pub workflow: Arc<Workflow>,
    pub tokens: Arc<dyn TokenStore>,
    pub temp_root: TempDir,
}

impl TestWorkflow {
    pub fn new(lister: Arc<dyn FormatLister>, downloader: Arc<dyn Downloader>, limits: WorkflowLimits) -> Self {
        Self::with_pool(lister, downloader, limits, WorkerPool::new(2))
    }

    pub fn with_pool(
        lister: Arc<dyn FormatLister>,
        downloader: Arc<dyn Downloader>,
        limits: WorkflowLimits,
        pool: WorkerPool,
    ) -> Self {
        let temp_root = TempDir::new().unwrap();
        let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new(Duration::from_secs(60), 1000));
        let workflow = Workflow::new(lister, downloader, Arc::clone(&tokens), pool)
            .with_temp_root(temp_root.path())
            .with_limits(limits);
        Self {
            workflow: Arc::new(workflow),
            tokens,
            temp_root,
        }
    }

    /// True when no per-request scratch directory is left behind
    pub fn is_clean(&self) -> bool {
        dir_is_empty(self.temp_root.path())
    }
}
