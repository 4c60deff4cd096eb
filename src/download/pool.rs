//! Bounded worker pool for extraction and download jobs.
//!
//! The dispatcher never runs yt-dlp work inline: jobs are spawned onto their
//! own task behind a semaphore, so a slow or panicking job only affects the
//! request that submitted it.

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker pool is closed")]
    Closed,
    #[error("worker task panicked: {0}")]
    Panicked(String),
    #[error("worker task was cancelled")]
    Cancelled,
}

#[derive(Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Free slots right now
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Waits for a slot, then runs `job` on its own task.
    ///
    /// Dropping the returned future while the job runs does not stop the job;
    /// the slot is released when the job finishes.
    pub async fn run<F, T>(&self, job: F) -> Result<T, PoolError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed)?;

        let handle = tokio::spawn(async move {
            let _permit = permit;
            job.await
        });

        handle.await.map_err(|e| {
            if e.is_panic() {
                let payload = e.into_panic();
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                log::error!("Worker task panicked: {}", message);
                PoolError::Panicked(message)
            } else {
                PoolError::Cancelled
            }
        })
    }
}
