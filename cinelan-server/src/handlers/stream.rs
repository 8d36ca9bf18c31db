use super::{resolve_media_path, FileQuery};
use crate::errors::ApiResult;
use crate::range::serve_file;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
};

/// Serve a natively streamable file straight from disk. Only MP4s with
/// their metadata up front take this route; everything else goes through
/// the HLS endpoint.
pub async fn video_handler(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let path = resolve_media_path(&state, &query.file)?;
    serve_file(&path, &headers, content_type_for(&path), None).await
}

pub(crate) fn content_type_for(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .as_deref()
    {
        Some("mp4") => "video/mp4",
        Some("m4v") => "video/x-m4v",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("flv") => "video/x-flv",
        Some("wmv") => "video/x-ms-wmv",
        Some("ts") | Some("mts") | Some("m2ts") => "video/mp2t",
        _ => "application/octet-stream",
    }
}
