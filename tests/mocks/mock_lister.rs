//! Format lister returning a canned answer

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

use tubegrab::download::cookies::CredentialRef;
use tubegrab::download::{FormatEntry, FormatLister, VideoInfo};

pub struct MockLister {
    result: Result<VideoInfo, String>,
    delay: Duration,
    calls: AtomicUsize,
    credentials: Mutex<Vec<Option<CredentialRef>>>,
}

impl MockLister {
    pub fn with_formats(title: &str, formats: Vec<FormatEntry>) -> Self {
        Self::with_result(Ok(VideoInfo {
            title: Some(title.to_string()),
            formats,
        }))
    }

    pub fn failing(cause: &str) -> Self {
        Self::with_result(Err(cause.to_string()))
    }

    fn with_result(result: Result<VideoInfo, String>) -> Self {
        Self {
            result,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            credentials: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_credentials(&self) -> Vec<Option<CredentialRef>> {
        self.credentials.lock().unwrap().clone()
    }
}

#[async_trait]
impl FormatLister for MockLister {
    async fn list_formats(&self, _url: &str, credential: Option<&CredentialRef>) -> Result<VideoInfo, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.credentials.lock().unwrap().push(credential.cloned());
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.result.clone()
    }
}
