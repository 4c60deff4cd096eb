//! Format list parsing and the resolution menu.
//!
//! `yt-dlp -J` reports dozens of encodings per video. The menu keeps one entry
//! per distinct vertical resolution, highest first, and binds each entry to a
//! freshly minted token.

use serde_json::Value;

use crate::download::cookies::CredentialRef;
use crate::download::error::WorkflowError;
use crate::download::token_store::TokenStore;

/// One encoding variant reported by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatEntry {
    pub format_id: String,
    /// Vertical resolution; `None` or `Some(0)` for audio-only/unknown
    pub height: Option<u32>,
    pub has_video: bool,
    pub ext: Option<String>,
    pub filesize: Option<u64>,
}

impl FormatEntry {
    /// Minimal entry, handy for callers that only know id/height/video.
    pub fn new(format_id: impl Into<String>, height: Option<u32>, has_video: bool) -> Self {
        Self {
            format_id: format_id.into(),
            height,
            has_video,
            ext: None,
            filesize: None,
        }
    }

    fn effective_height(&self) -> u32 {
        self.height.unwrap_or(0)
    }
}

/// Metadata plus format list for one source URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub formats: Vec<FormatEntry>,
}

/// Display-ready menu row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub height: u32,
    pub label: String,
    pub format_id: String,
    pub token: String,
    pub filesize: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub title: Option<String>,
    pub entries: Vec<MenuEntry>,
}

pub fn height_label(height: u32) -> String {
    format!("{}p", height)
}

/// Orders and deduplicates formats: descending height, video only, one per height.
///
/// The sort is stable, so among formats sharing a height the one listed first
/// by the extractor wins.
pub fn rank_formats(formats: &[FormatEntry]) -> Vec<&FormatEntry> {
    let mut sorted: Vec<&FormatEntry> = formats.iter().collect();
    sorted.sort_by(|a, b| b.effective_height().cmp(&a.effective_height()));

    let mut accepted: Vec<&FormatEntry> = Vec::new();
    for format in sorted {
        let height = format.effective_height();
        if !format.has_video || height == 0 {
            continue;
        }
        // Sorted input: a duplicate height can only sit right after its twin
        if accepted.last().is_some_and(|last| last.effective_height() == height) {
            continue;
        }
        accepted.push(format);
    }
    accepted
}

/// Resolution Selector: ranks the formats and registers one token per menu entry.
pub fn build_menu(
    source_url: &str,
    credential_ref: Option<CredentialRef>,
    info: &VideoInfo,
    tokens: &dyn TokenStore,
) -> Result<Menu, WorkflowError> {
    let ranked = rank_formats(&info.formats);
    if ranked.is_empty() {
        log::info!(
            "No downloadable video among {} formats for {}",
            info.formats.len(),
            source_url
        );
        return Err(WorkflowError::NoDownloadableFormat);
    }

    let entries = ranked
        .into_iter()
        .map(|format| {
            let height = format.effective_height();
            let label = height_label(height);
            let request = tokens.issue(source_url, &format.format_id, &label, credential_ref.clone());
            MenuEntry {
                height,
                label,
                format_id: format.format_id.clone(),
                token: request.token,
                filesize: format.filesize,
            }
        })
        .collect();

    Ok(Menu {
        title: info.title.clone(),
        entries,
    })
}

/// Parses `WxH` strings such as "1920x1080" into (width, height).
fn parse_resolution_string(resolution: &str) -> Option<(u32, u32)> {
    let (width_part, height_part) = resolution.split_once('x')?;

    let width_str: String = width_part.chars().filter(|c| c.is_ascii_digit()).collect();
    let height_str: String = height_part.chars().filter(|c| c.is_ascii_digit()).collect();

    if width_str.is_empty() || height_str.is_empty() {
        return None;
    }

    Some((width_str.parse().ok()?, height_str.parse().ok()?))
}

fn parse_format(format: &Value) -> Option<FormatEntry> {
    let format_id = format.get("format_id").and_then(Value::as_str)?.to_string();

    let resolution_height = format
        .get("resolution")
        .and_then(Value::as_str)
        .and_then(parse_resolution_string)
        .map(|(_, h)| h);
    let height = format
        .get("height")
        .and_then(Value::as_u64)
        .and_then(|h| u32::try_from(h).ok())
        .or(resolution_height);

    // Some extractors omit vcodec for progressive files; a known height is then enough.
    let has_video = match format.get("vcodec").and_then(Value::as_str) {
        Some("none") => false,
        Some(_) => true,
        None => height.is_some_and(|h| h > 0),
    };

    let filesize = format
        .get("filesize")
        .or_else(|| format.get("filesize_approx"))
        .and_then(Value::as_u64);

    Some(FormatEntry {
        format_id,
        height,
        has_video,
        ext: format.get("ext").and_then(Value::as_str).map(str::to_string),
        filesize,
    })
}

/// Converts `yt-dlp -J` output into [`VideoInfo`].
pub fn parse_video_info(json: &Value) -> VideoInfo {
    let formats = json
        .get("formats")
        .and_then(Value::as_array)
        .map(|formats| formats.iter().filter_map(parse_format).collect())
        .unwrap_or_default();

    VideoInfo {
        title: json.get("title").and_then(Value::as_str).map(str::to_string),
        formats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::token_store::MemoryTokenStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn store() -> MemoryTokenStore {
        MemoryTokenStore::new(Duration::from_secs(60), 100)
    }

    fn heights(ranked: &[&FormatEntry]) -> Vec<u32> {
        ranked.iter().map(|f| f.effective_height()).collect()
    }

    #[test]
    fn test_rank_formats_dedup_and_order() {
        let formats = vec![
            FormatEntry::new("a", Some(360), true),
            FormatEntry::new("b", Some(1080), true),
            FormatEntry::new("c", Some(720), true),
            FormatEntry::new("d", Some(1080), true),
            FormatEntry::new("e", Some(480), true),
        ];
        let ranked = rank_formats(&formats);
        assert_eq!(heights(&ranked), vec![1080, 720, 480, 360]);
        // First 1080p in input order wins the tie
        assert_eq!(ranked[0].format_id, "b");
    }

    #[test]
    fn test_rank_formats_skips_audio_and_unknown() {
        let formats = vec![
            FormatEntry::new("audio", Some(0), false),
            FormatEntry::new("nov", Some(720), false),
            FormatEntry::new("unknown", None, true),
            FormatEntry::new("zero", Some(0), true),
            FormatEntry::new("ok", Some(240), true),
        ];
        let ranked = rank_formats(&formats);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].format_id, "ok");
    }

    #[test]
    fn test_rank_formats_strictly_descending_on_messy_input() {
        let formats: Vec<FormatEntry> = [144, 2160, 720, 720, 0, 1440, 144, 1080, 2160, 360]
            .iter()
            .enumerate()
            .map(|(i, h)| FormatEntry::new(i.to_string(), Some(*h), i % 4 != 3))
            .collect();
        let ranked = rank_formats(&formats);
        let hs = heights(&ranked);
        assert!(hs.windows(2).all(|w| w[0] > w[1]), "not strictly descending: {:?}", hs);
        assert!(hs.iter().all(|h| *h > 0));
    }

    #[test]
    fn test_build_menu_scenario() {
        let store = store();
        let info = VideoInfo {
            title: Some("clip".into()),
            formats: vec![
                FormatEntry::new("a", Some(1080), true),
                FormatEntry::new("b", Some(720), true),
                FormatEntry::new("c", Some(720), true),
                FormatEntry::new("d", Some(0), false),
            ],
        };

        let menu = build_menu("https://example.com/v", None, &info, &store).unwrap();
        let rows: Vec<(&str, &str)> = menu
            .entries
            .iter()
            .map(|e| (e.label.as_str(), e.format_id.as_str()))
            .collect();
        assert_eq!(rows, vec![("1080p", "a"), ("720p", "b")]);
        assert_eq!(menu.title.as_deref(), Some("clip"));
        assert_ne!(menu.entries[0].token, menu.entries[1].token);
        assert_eq!(store.len(), 2);

        let request = store.take(&menu.entries[0].token).unwrap();
        assert_eq!(request.format_id, "a");
        assert_eq!(request.source_url, "https://example.com/v");
    }

    #[test]
    fn test_build_menu_no_downloadable_format() {
        let store = store();
        let info = VideoInfo {
            title: None,
            formats: vec![
                FormatEntry::new("audio", Some(0), false),
                FormatEntry::new("storyboard", None, true),
            ],
        };
        let result = build_menu("https://example.com/v", None, &info, &store);
        assert!(matches!(result, Err(WorkflowError::NoDownloadableFormat)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_build_menu_passes_credential_through() {
        let store = store();
        let info = VideoInfo {
            title: None,
            formats: vec![FormatEntry::new("22", Some(720), true)],
        };
        let credential = CredentialRef::new("/tmp/cookies.txt");
        let menu = build_menu("https://example.com/v", Some(credential.clone()), &info, &store).unwrap();
        let request = store.take(&menu.entries[0].token).unwrap();
        assert_eq!(request.credential_ref, Some(credential));
    }

    #[test]
    fn test_parse_resolution_string() {
        assert_eq!(parse_resolution_string("1920x1080"), Some((1920, 1080)));
        assert_eq!(parse_resolution_string("1280x720p"), Some((1280, 720)));
        assert_eq!(parse_resolution_string("audio only"), None);
    }

    #[test]
    fn test_parse_video_info() {
        let json = json!({
            "title": "Some video",
            "formats": [
                {"format_id": "140", "vcodec": "none", "acodec": "mp4a", "ext": "m4a", "filesize": 1000},
                {"format_id": "137", "vcodec": "avc1", "height": 1080, "ext": "mp4", "filesize_approx": 5000},
                {"format_id": "sb0", "vcodec": "none", "height": 45},
                {"format_id": "prog", "resolution": "640x360"},
                {"vcodec": "avc1", "height": 720}
            ]
        });

        let info = parse_video_info(&json);
        assert_eq!(info.title.as_deref(), Some("Some video"));
        assert_eq!(info.formats.len(), 4);

        assert!(!info.formats[0].has_video);
        assert_eq!(info.formats[0].filesize, Some(1000));

        assert_eq!(info.formats[1].height, Some(1080));
        assert!(info.formats[1].has_video);
        assert_eq!(info.formats[1].filesize, Some(5000));

        assert!(!info.formats[2].has_video);

        assert_eq!(info.formats[3].height, Some(360));
        assert!(info.formats[3].has_video);
    }

    #[test]
    fn test_parse_video_info_without_formats() {
        let info = parse_video_info(&json!({"title": "x"}));
        assert!(info.formats.is_empty());
    }
}
