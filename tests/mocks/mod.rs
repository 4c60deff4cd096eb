//! Mock implementations of the workflow collaborators
//!
//! They stand in for yt-dlp and the Telegram upload so the workflow can be
//! exercised without network or external binaries.

pub mod mock_downloader;
pub mod mock_lister;
pub mod recording_sink;

#[allow(unused_imports)]
pub use mock_downloader::{MockDownloadBehavior, MockDownloader};
#[allow(unused_imports)]
pub use mock_lister::MockLister;
#[allow(unused_imports)]
pub use recording_sink::{DeliveryRecord, RecordingSink};
