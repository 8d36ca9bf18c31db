use super::{resolve_media_path, FileQuery};
use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;
use crate::thumbs::PLACEHOLDER_SVG;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
};
use tracing::debug;

/// Serve a cached (or freshly grabbed) thumbnail frame. Extraction failures
/// degrade to a placeholder image rather than an error; a broken file
/// should still appear in the library grid.
pub async fn thumb_handler(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> ApiResult<Response> {
    let path = resolve_media_path(&state, &query.file)?;

    match state.thumbs.get_or_generate(&path).await {
        Ok(thumb) => {
            let bytes = tokio::fs::read(&thumb)
                .await
                .map_err(|e| ApiError::Disk(format!("thumbnail read: {e}")))?;
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "image/jpeg")
                .header(header::CACHE_CONTROL, "public, max-age=86400")
                .body(axum::body::Body::from(bytes))
                .unwrap())
        }
        Err(e) => {
            debug!("thumbnail fallback for {}: {}", query.file, e);
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "image/svg+xml")
                .header(header::CACHE_CONTROL, "public, max-age=3600")
                .body(axum::body::Body::from(PLACEHOLDER_SVG))
                .unwrap())
        }
    }
}
