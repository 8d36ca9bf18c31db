use super::{resolve_media_path, FileQuery};
use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Json,
};
use cinelan_core::{classify, Delivery};
use serde_json::{json, Value};
use tracing::info;

/// Playback decision for one file: direct URL for natively streamable MP4s,
/// otherwise the HLS job is started (or resumed from cache) and its
/// playlist URL returned. Starting here means the first segments are often
/// already on disk by the time the player asks for the playlist.
pub async fn play_handler(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> ApiResult<Json<Value>> {
    let path = resolve_media_path(&state, &query.file)?;
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(ApiError::Unknown(query.file));
    }

    let name = std::path::Path::new(&query.file)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| query.file.clone());

    match classify(&path) {
        Delivery::Direct => Ok(Json(json!({
            "name": name,
            "use_hls": false,
            "video_url": format!("/video?file={}", query.file),
        }))),
        Delivery::Hls => {
            let job = state
                .hls
                .get_or_start(&path)
                .await
                .map_err(|e| ApiError::JobStart(e.to_string()))?;
            info!("{}: playing via HLS ({})", name, job.key);
            Ok(Json(json!({
                "name": name,
                "use_hls": true,
                "hls_key": job.key,
                "playlist_url": format!("/hls/{}/stream.m3u8", job.key),
            })))
        }
    }
}
