use std::path::{Path, PathBuf};

/// Master playlist filename inside an artifact directory.
pub const PLAYLIST_NAME: &str = "stream.m3u8";

/// ffmpeg filename template for the numbered MPEG-TS segments.
pub const SEGMENT_TEMPLATE: &str = "seg%05d.ts";

/// End-of-list marker ffmpeg appends once the last segment is flushed.
/// Its presence is the commit barrier for the whole artifact.
const END_MARKER: &str = "#EXT-X-ENDLIST";

/// Artifact directory for a fingerprint key.
pub fn artifact_dir(cache_root: &Path, key: &str) -> PathBuf {
    cache_root.join(key)
}

/// Path of the master playlist inside an artifact directory.
pub fn playlist_path(dir: &Path) -> PathBuf {
    dir.join(PLAYLIST_NAME)
}

/// Whether an artifact directory holds a finished rendition. Anything short
/// of a terminated playlist is an in-flight or aborted run and must not be
/// served as a cache hit.
pub fn is_complete(dir: &Path) -> bool {
    match std::fs::read_to_string(playlist_path(dir)) {
        Ok(contents) => contents.contains(END_MARKER),
        Err(_) => false,
    }
}
