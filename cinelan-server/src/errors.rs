use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cinelan_core::CoreError;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Everything a cinelan handler can fail with, one variant per way the
/// player or browser is expected to react.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request carried no usable `file` parameter.
    #[error("no file requested")]
    MissingFile,

    /// The requested path escapes the media root or names a non-video.
    #[error("not a servable path: {0}")]
    ForbiddenPath(String),

    /// No media file or HLS artifact exists under the requested name.
    #[error("nothing to serve for {0}")]
    Unknown(String),

    /// The transcoder has not produced the requested artifact yet; the
    /// player should retry.
    #[error("still transcoding: {0}")]
    Pending(&'static str),

    /// A transcode job could not be started for the file.
    #[error("transcode failed to start: {0}")]
    JobStart(String),

    /// Reading from the media directory or cache failed partway.
    #[error("disk read failed: {0}")]
    Disk(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFile => StatusCode::BAD_REQUEST,
            Self::ForbiddenPath(_) => StatusCode::FORBIDDEN,
            Self::Unknown(_) => StatusCode::NOT_FOUND,
            Self::Pending(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::JobStart(_) | Self::Disk(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "status": status.as_u16(),
            "reason": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NoSuchMedia { path } => Self::Unknown(path.display().to_string()),
            CoreError::UnusableSource { path, reason } => {
                Self::ForbiddenPath(format!("{}: {}", path.display(), reason))
            }
            CoreError::Admission { key, reason } => {
                Self::JobStart(format!("{}: {}", key, reason))
            }
            CoreError::Io(e) => Self::Disk(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::ForbiddenPath("x".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::Unknown("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Pending("playlist").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::JobStart("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_core_errors_map_to_statuses() {
        let err: ApiError = CoreError::NoSuchMedia {
            path: "/v/ghost.mkv".into(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: ApiError = CoreError::Admission {
            key: "feedfacefeedface".into(),
            reason: "spawn failed".into(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
