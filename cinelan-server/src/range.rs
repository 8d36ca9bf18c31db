use crate::errors::{ApiError, ApiResult};
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::warn;

#[derive(Debug, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

/// Serve a file from disk with byte-range support.
///
/// A valid `Range` header yields a 206 with the requested slice; anything
/// else streams the whole file. `cache_control` is set when provided
/// (playlists must not be cached while the transcoder appends to them).
pub async fn serve_file(
    path: &Path,
    headers: &HeaderMap,
    content_type: &str,
    cache_control: Option<&str>,
) -> ApiResult<Response> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|_| ApiError::Unknown(path.display().to_string()))?;

    let meta = file
        .metadata()
        .await
        .map_err(|e| ApiError::Disk(format!("file metadata: {e}")))?;
    let file_size = meta.len();

    if let Some(range_header) = headers.get(header::RANGE) {
        if let Ok(range_str) = range_header.to_str() {
            if let Some(range) = parse_range_header(range_str, file_size) {
                return serve_range(file, range, file_size, content_type, cache_control).await;
            }
        }
    }

    let stream = ReaderStream::new(file);
    let body = axum::body::Body::from_stream(stream);

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, file_size.to_string())
        .header(header::ACCEPT_RANGES, "bytes");
    if let Some(value) = cache_control {
        builder = builder.header(header::CACHE_CONTROL, value);
    }
    Ok(builder.body(body).unwrap())
}

async fn serve_range(
    mut file: tokio::fs::File,
    range: ByteRange,
    file_size: u64,
    content_type: &str,
    cache_control: Option<&str>,
) -> ApiResult<Response> {
    if let Err(e) = file.seek(std::io::SeekFrom::Start(range.start)).await {
        warn!("failed to seek in file: {}", e);
        return Err(ApiError::Disk(format!("seek: {e}")));
    }

    let content_length = range.end - range.start + 1;
    let mut buffer = vec![0; content_length as usize];
    if let Err(e) = file.read_exact(&mut buffer).await {
        warn!("failed to read file range: {}", e);
        return Err(ApiError::Disk(format!("range read: {e}")));
    }

    let mut builder = Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content_length.to_string())
        .header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", range.start, range.end, file_size),
        )
        .header(header::ACCEPT_RANGES, "bytes");
    if let Some(value) = cache_control {
        builder = builder.header(header::CACHE_CONTROL, value);
    }
    Ok(builder.body(axum::body::Body::from(buffer)).unwrap())
}

/// Parse a `bytes=start-end` range header against a known file size.
/// Suffix (`-500`) and open-ended (`500-`) forms are both accepted;
/// anything unsatisfiable returns `None` and the caller serves the whole
/// file.
pub fn parse_range_header(range_str: &str, file_size: u64) -> Option<ByteRange> {
    let range_part = range_str.strip_prefix("bytes=")?;
    let (start_str, end_str) = range_part.split_once('-')?;

    let start = if start_str.is_empty() {
        // Suffix range: last N bytes.
        let suffix_len: u64 = end_str.parse().ok()?;
        file_size.saturating_sub(suffix_len)
    } else {
        start_str.parse().ok()?
    };

    let end = if start_str.is_empty() || end_str.is_empty() {
        file_size.checked_sub(1)?
    } else {
        std::cmp::min(end_str.parse().ok()?, file_size.saturating_sub(1))
    };

    if start <= end && start < file_size {
        Some(ByteRange { start, end })
    } else {
        None
    }
}
