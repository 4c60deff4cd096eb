//! Download workflow: format selection, request tokens, yt-dlp backend and orchestration

pub mod cookies;
pub mod error;
pub mod formats;
pub mod pipeline;
pub mod pool;
pub mod token_store;
pub mod traits;
pub mod ytdlp;

// Re-exports for convenience
pub use error::WorkflowError;
pub use formats::{FormatEntry, Menu, MenuEntry, VideoInfo};
pub use pipeline::{Delivered, Workflow, WorkflowLimits};
pub use pool::WorkerPool;
pub use token_store::{MemoryTokenStore, PendingRequest, TokenStore};
pub use traits::{DeliverySink, Downloader, FormatLister};
pub use ytdlp::YtDlp;
