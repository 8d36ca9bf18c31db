use std::path::PathBuf;
use thiserror::Error;

/// Failure modes of the streaming core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Filesystem access under the media root or cache failed.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// A transcode job could not be admitted into the registry.
    #[error("transcode admission failed for {key}: {reason}")]
    Admission { key: String, reason: String },

    /// Nothing playable exists at the requested path.
    #[error("no playable media at {}", .path.display())]
    NoSuchMedia { path: PathBuf },

    /// The path exists but cannot serve as a media source.
    #[error("unusable media source {}: {reason}", .path.display())]
    UnusableSource { path: PathBuf, reason: String },
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
