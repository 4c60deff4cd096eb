use thiserror::Error;

use crate::core::config::limits::USER_ERROR_MAX_CHARS;

/// Structured error type for the URL → menu → download → delivery workflow.
///
/// Every variant is local to one user's request. None of them is retried
/// automatically: resubmission always needs new input from the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The format lister could not process the URL (bad URL, unsupported site, network)
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
    /// Extraction succeeded but no entry carries a video stream with a known height
    #[error("no downloadable video format")]
    NoDownloadableFormat,
    /// The menu button refers to a consumed, expired or forged token
    #[error("token expired or invalid")]
    ExpiredOrInvalidToken,
    /// The downloader failed, timed out, or left no artifact behind
    #[error("download failed: {0}")]
    DownloadFailed(String),
    /// The artifact is larger than the delivery ceiling
    #[error("file too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },
    /// The delivery sink rejected or failed to transmit the artifact
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}

impl WorkflowError {
    /// Returns subcategory for log fields
    pub fn subcategory(&self) -> &'static str {
        match self {
            WorkflowError::ExtractionFailed(_) => "extraction_failed",
            WorkflowError::NoDownloadableFormat => "no_downloadable_format",
            WorkflowError::ExpiredOrInvalidToken => "expired_or_invalid_token",
            WorkflowError::DownloadFailed(_) => "download_failed",
            WorkflowError::FileTooLarge { .. } => "file_too_large",
            WorkflowError::DeliveryFailed(_) => "delivery_failed",
        }
    }

    /// Text shown in the chat.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::ExtractionFailed(cause) => {
                format!("❌ Couldn't read this link:\n{}", truncate_cause(cause))
            }
            WorkflowError::NoDownloadableFormat => "❌ No downloadable video formats found for this link.".to_string(),
            WorkflowError::ExpiredOrInvalidToken => {
                "⌛ This menu has expired. Please send the link again.".to_string()
            }
            WorkflowError::DownloadFailed(cause) => format!("❌ Download failed:\n{}", truncate_cause(cause)),
            WorkflowError::FileTooLarge { size, limit } => format!(
                "⚠️ The file is {} but Telegram accepts at most {}. Please pick a lower resolution.",
                format_size(*size),
                format_size(*limit)
            ),
            WorkflowError::DeliveryFailed(cause) => {
                format!("❌ Couldn't upload the file:\n{}", truncate_cause(cause))
            }
        }
    }
}

/// Cuts an error cause to the length we are willing to show a user.
pub fn truncate_cause(cause: &str) -> String {
    let cause = cause.trim();
    if cause.chars().count() <= USER_ERROR_MAX_CHARS {
        return cause.to_string();
    }
    let mut trimmed: String = cause.chars().take(USER_ERROR_MAX_CHARS).collect();
    trimmed.push('…');
    trimmed
}

/// Human-readable byte size (binary units).
pub fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let value = bytes as f64;
    if value >= GIB {
        format!("{:.2} GB", value / GIB)
    } else if value >= MIB {
        format!("{:.1} MB", value / MIB)
    } else if value >= KIB {
        format!("{:.1} KB", value / KIB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subcategory() {
        assert_eq!(WorkflowError::ExtractionFailed("".into()).subcategory(), "extraction_failed");
        assert_eq!(WorkflowError::NoDownloadableFormat.subcategory(), "no_downloadable_format");
        assert_eq!(WorkflowError::ExpiredOrInvalidToken.subcategory(), "expired_or_invalid_token");
        assert_eq!(WorkflowError::DownloadFailed("".into()).subcategory(), "download_failed");
        assert_eq!(
            WorkflowError::FileTooLarge { size: 2, limit: 1 }.subcategory(),
            "file_too_large"
        );
        assert_eq!(WorkflowError::DeliveryFailed("".into()).subcategory(), "delivery_failed");
    }

    #[test]
    fn test_user_message_truncates_long_causes() {
        let cause = "x".repeat(USER_ERROR_MAX_CHARS * 2);
        let message = WorkflowError::ExtractionFailed(cause).user_message();
        assert!(message.ends_with('…'));
        assert!(message.chars().count() < USER_ERROR_MAX_CHARS + 50);
    }

    #[test]
    fn test_user_message_expired_asks_for_resubmit() {
        let message = WorkflowError::ExpiredOrInvalidToken.user_message();
        assert!(message.contains("send the link again"));
    }

    #[test]
    fn test_file_too_large_suggests_lower_resolution() {
        let message = WorkflowError::FileTooLarge {
            size: 3 * 1024 * 1024 * 1024,
            limit: 2 * 1024 * 1024 * 1024,
        }
        .user_message();
        assert!(message.contains("3.00 GB"));
        assert!(message.contains("2.00 GB"));
        assert!(message.contains("lower resolution"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
