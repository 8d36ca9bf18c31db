use crate::errors::{ApiError, ApiResult};
use crate::range::serve_file;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// An unstarted transcoder needs a few seconds before the playlist lists
/// its first segment.
const PLAYLIST_TIMEOUT: Duration = Duration::from_secs(15);
/// Segments are requested by name ahead of the encoder's write position, so
/// they get a longer grace period.
const SEGMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Serve one HLS artifact (`stream.m3u8` or `segNNNNN.ts`) for a job key.
///
/// The artifact may not exist yet when requested; both branches poll
/// bounded-ly for the transcoder to catch up and answer 503 when it does
/// not, leaving the retry to the player.
pub async fn artifact_handler(
    State(state): State<AppState>,
    Path((key, name)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    // Segment names come straight off the wire; nothing may escape the
    // artifact directory.
    if name.contains('/') || name.contains("..") {
        return Err(ApiError::Unknown(name));
    }

    state.hls.touch(&key).await;

    let dir = state
        .hls
        .resolve_dir(&key)
        .await
        .ok_or_else(|| ApiError::Unknown(key.clone()))?;
    let file_path = dir.join(&name);

    if name.ends_with(".m3u8") {
        if !wait_for_playlist(&file_path, PLAYLIST_TIMEOUT).await {
            return Err(ApiError::Pending("playlist"));
        }
        serve_file(
            &file_path,
            &headers,
            "application/vnd.apple.mpegurl",
            Some("no-cache"),
        )
        .await
    } else if name.ends_with(".ts") {
        if !wait_for_segment(&file_path, SEGMENT_TIMEOUT).await {
            return Err(ApiError::Pending("segment"));
        }
        serve_file(&file_path, &headers, "video/mp2t", None).await
    } else {
        Err(ApiError::Unknown(name))
    }
}

/// A playlist is ready once it references at least one segment; before
/// that it is an empty header the player cannot act on.
async fn wait_for_playlist(path: &std::path::Path, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Ok(contents) = tokio::fs::read_to_string(path).await {
            if contents.contains(".ts") {
                return true;
            }
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn wait_for_segment(path: &std::path::Path, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if tokio::fs::metadata(path).await.is_ok() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
