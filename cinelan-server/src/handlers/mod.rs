pub mod hls;
pub mod library;
pub mod play;
pub mod stream;
pub mod thumb;

use crate::errors::ApiError;
use crate::state::AppState;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// Query shape shared by every endpoint addressing one media file.
#[derive(Debug, Deserialize)]
pub(crate) struct FileQuery {
    pub file: String,
}

/// Validate a client-supplied, media-root-relative path and resolve it to
/// an absolute one. Anything empty, absolute, escaping the root, or not a
/// known video extension is rejected before it touches the filesystem.
pub(crate) fn resolve_media_path(state: &AppState, rel: &str) -> Result<PathBuf, ApiError> {
    if rel.is_empty() {
        return Err(ApiError::MissingFile);
    }

    let rel_path = Path::new(rel);
    let escapes = rel_path.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if rel_path.is_absolute() || escapes || !state.scanner.is_video_file(rel_path) {
        return Err(ApiError::ForbiddenPath(rel.to_string()));
    }

    Ok(state.config.media_root.join(rel_path))
}
