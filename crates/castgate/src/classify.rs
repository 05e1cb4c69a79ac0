use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::load::StreamType;

pub const HLS_CONTENT_TYPE: &str = "application/x-mpegURL";
pub const DASH_CONTENT_TYPE: &str = "application/dash+xml";

static LIVE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/(live|timeshift)/").expect("valid live path regex"));

/// Why a session was considered live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveSignal {
    /// The sender declared `streamType: LIVE`.
    Declared,
    /// `customData.isLive` was set.
    Hint,
    /// The locator path contains a live or timeshift segment.
    LivePath,
    /// The locator points to an HLS playlist.
    Playlist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamClassification {
    pub stream_type: StreamType,
    /// Content type that must replace whatever the sender declared.
    pub content_type: Option<&'static str>,
    pub signals: Vec<LiveSignal>,
}

impl StreamClassification {
    pub fn is_live(&self) -> bool {
        self.stream_type == StreamType::Live
    }
}

/// Path component of a locator, lowercased, without query or fragment.
fn locator_path(locator: &str) -> String {
    match Url::parse(locator) {
        Ok(url) => url.path().to_lowercase(),
        Err(_) => {
            let end = locator
                .find(|c: char| c == '?' || c == '#')
                .unwrap_or(locator.len());
            locator[..end].to_lowercase()
        }
    }
}

pub fn is_hls_locator(locator: &str) -> bool {
    locator_path(locator).ends_with(".m3u8")
}

pub fn is_dash_locator(locator: &str) -> bool {
    locator_path(locator).ends_with(".mpd")
}

pub fn is_live_path(locator: &str) -> bool {
    LIVE_PATH.is_match(&locator_path(locator))
}

/// Decide liveness and content type for a LOAD.
///
/// Any positive signal makes the session live.
pub fn classify(
    locator: &str,
    declared: Option<StreamType>,
    live_hint: Option<bool>,
) -> StreamClassification {
    let hls = is_hls_locator(locator);

    let mut signals = Vec::new();
    if declared == Some(StreamType::Live) {
        signals.push(LiveSignal::Declared);
    }
    if live_hint == Some(true) {
        signals.push(LiveSignal::Hint);
    }
    if is_live_path(locator) {
        signals.push(LiveSignal::LivePath);
    }
    if hls {
        signals.push(LiveSignal::Playlist);
    }

    let content_type = if hls {
        Some(HLS_CONTENT_TYPE)
    } else if is_dash_locator(locator) {
        Some(DASH_CONTENT_TYPE)
    } else {
        None
    };

    StreamClassification {
        stream_type: if signals.is_empty() {
            StreamType::Buffered
        } else {
            StreamType::Live
        },
        content_type,
        signals,
    }
}
