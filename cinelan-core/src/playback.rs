use crate::mp4;
use std::path::Path;

/// MP4s at or above this size are inspected for a trailing `moov`; below it
/// a full-file download is tolerable even when the browser cannot seek.
pub const LARGE_MP4_THRESHOLD: u64 = 500 * 1024 * 1024;

/// How a file reaches the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The browser streams the file as-is.
    Direct,
    /// The file is repackaged (and possibly re-encoded) into HLS first.
    Hls,
}

/// How the transcoder treats the video elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HlsMode {
    /// Rewrap the existing H.264 stream into MPEG-TS segments.
    Copy,
    /// Re-encode to H.264.
    Transcode,
}

/// Decide whether a file can be served directly or needs HLS.
pub fn classify<P: AsRef<Path>>(path: P) -> Delivery {
    let path = path.as_ref();
    if !is_native_container(path) || needs_streaming_mp4(path) {
        Delivery::Hls
    } else {
        Delivery::Direct
    }
}

/// Codecs every mainstream browser decodes in an MPEG-TS segment.
pub fn browser_playable_codec(codec: &str) -> bool {
    matches!(codec, "h264" | "avc1" | "avc")
}

/// Pick the transcoder mode for a probed codec name. An empty name (probe
/// failure) re-encodes rather than copying a stream we know nothing about.
pub fn hls_mode(codec: &str) -> HlsMode {
    if browser_playable_codec(codec) {
        HlsMode::Copy
    } else {
        HlsMode::Transcode
    }
}

fn is_native_container(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref(),
        Some("mp4") | Some("m4v")
    )
}

/// A large MP4 with its `moov` box at the tail cannot be seeked while
/// progressively downloading, so it goes through HLS despite the container.
fn needs_streaming_mp4(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if meta.len() < LARGE_MP4_THRESHOLD {
        return false;
    }
    !mp4::has_moov_at_front(path)
}
