use crate::errors::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Json,
};
use cinelan_core::scanner;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Deserialize)]
pub struct LibraryQuery {
    page: Option<usize>,
    size: Option<usize>,
}

/// Paginated listing of the media root. The scan runs per request so newly
/// dropped files show up without a rescan endpoint; durations come from the
/// probe cache and are only resolved for the requested page.
pub async fn library_handler(
    State(state): State<AppState>,
    Query(query): Query<LibraryQuery>,
) -> ApiResult<Json<Value>> {
    let videos = state.scanner.scan_directory(&state.config.media_root)?;

    let size = match query.size {
        Some(size) if size > 0 => size,
        _ => DEFAULT_PAGE_SIZE,
    };
    let total = videos.len();
    let total_pages = std::cmp::max(1, total.div_ceil(size));
    let page = query.page.unwrap_or(1).clamp(1, total_pages);

    let start = (page - 1) * size;
    let end = std::cmp::min(start + size, total);

    let mut page_videos: Vec<_> = videos.into_iter().skip(start).take(end - start).collect();
    for video in &mut page_videos {
        let path = state.config.media_root.join(&video.rel_path);
        video.duration = scanner::cached_duration(
            &state.config.ffprobe_path,
            &state.config.thumb_cache_dir,
            &path,
        )
        .await;
    }

    info!(
        "library listing: {} of {} videos (page {}/{})",
        page_videos.len(),
        total,
        page,
        total_pages
    );

    Ok(Json(json!({
        "videos": page_videos,
        "page": page,
        "size": size,
        "total": total,
        "total_pages": total_pages,
    })))
}
