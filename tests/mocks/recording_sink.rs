//! Delivery sink that records what it was handed

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

use tubegrab::download::DeliverySink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    pub path: PathBuf,
    pub size: u64,
    /// Whether the file was present on disk while being delivered
    pub existed: bool,
    /// Size read from disk during delivery
    pub size_on_disk: Option<u64>,
}

#[derive(Default)]
pub struct RecordingSink {
    fail_with: Option<String>,
    delay: Duration,
    deliveries: Mutex<Vec<DeliveryRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(cause: &str) -> Self {
        Self {
            fail_with: Some(cause.to_string()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn deliveries(&self) -> Vec<DeliveryRecord> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }
}

#[async_trait]
impl DeliverySink for RecordingSink {
    async fn deliver(&self, file: &Path, size: u64) -> Result<(), String> {
        let size_on_disk = std::fs::metadata(file).ok().map(|m| m.len());
        self.deliveries.lock().unwrap().push(DeliveryRecord {
            path: file.to_path_buf(),
            size,
            existed: size_on_disk.is_some(),
            size_on_disk,
        });

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match &self.fail_with {
            Some(cause) => Err(cause.clone()),
            None => Ok(()),
        }
    }
}
