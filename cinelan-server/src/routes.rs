use crate::handlers::{
    hls::artifact_handler, library::library_handler, play::play_handler, stream::video_handler,
    thumb::thumb_handler,
};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/library", get(library_handler))
        .route("/api/play", get(play_handler))
        .route("/video", get(video_handler))
        .route("/hls/:key/:name", get(artifact_handler))
        .route("/thumb", get(thumb_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use cinelan_core::{media_key, store, HlsManager};
    use serde_json::Value;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const COMPLETE_PLAYLIST: &str = "#EXTM3U\n#EXTINF:6.0,\nseg00000.ts\n#EXT-X-ENDLIST\n";

    fn test_state(root: &TempDir) -> AppState {
        let media_root = root.path().join("media");
        fs::create_dir_all(&media_root).unwrap();

        let config = Arc::new(Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            media_root,
            hls_cache_dir: root.path().join("cache/hls"),
            thumb_cache_dir: root.path().join("cache/thumbs"),
            // A spawnable no-op; admission succeeds but nothing is written.
            ffmpeg_path: "true".to_string(),
            ffprobe_path: "/nonexistent/ffprobe".to_string(),
        });
        let hls = Arc::new(HlsManager::new(
            config.hls_cache_dir.clone(),
            config.ffmpeg_path.clone(),
            config.ffprobe_path.clone(),
        ));
        hls.init().unwrap();
        AppState::new(config, hls)
    }

    /// Drop a finished artifact into the on-disk cache for `key`.
    fn complete_artifact(state: &AppState, key: &str) -> std::path::PathBuf {
        let dir = store::artifact_dir(&state.config.hls_cache_dir, key);
        fs::create_dir_all(&dir).unwrap();
        fs::write(store::playlist_path(&dir), COMPLETE_PLAYLIST).unwrap();
        fs::write(dir.join("seg00000.ts"), b"0123456789").unwrap();
        dir
    }

    async fn get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_library_lists_and_paginates() {
        let root = TempDir::new().unwrap();
        let state = test_state(&root);
        fs::write(state.config.media_root.join("alpha.mkv"), b"a").unwrap();
        fs::write(state.config.media_root.join("beta.mp4"), b"b").unwrap();

        let response = get(create_app(state.clone()), "/api/library").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total"], 2);
        assert_eq!(json["videos"].as_array().unwrap().len(), 2);
        assert_eq!(json["videos"][0]["name"], "alpha");

        let response = get(create_app(state), "/api/library?size=1&page=2").await;
        let json = body_json(response).await;
        assert_eq!(json["total_pages"], 2);
        assert_eq!(json["page"], 2);
        assert_eq!(json["videos"].as_array().unwrap().len(), 1);
        assert_eq!(json["videos"][0]["name"], "beta");
    }

    #[tokio::test]
    async fn test_hls_rejects_traversal_names() {
        let root = TempDir::new().unwrap();
        let state = test_state(&root);

        let response = get(
            create_app(state),
            "/hls/0123456789abcdef/..evil.ts",
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hls_unknown_key_is_not_found() {
        let root = TempDir::new().unwrap();
        let state = test_state(&root);

        let response = get(create_app(state), "/hls/0123456789abcdef/stream.m3u8").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hls_serves_playlist_from_disk_cache() {
        let root = TempDir::new().unwrap();
        let state = test_state(&root);
        complete_artifact(&state, "feedfacefeedface");

        let response = get(
            create_app(state),
            "/hls/feedfacefeedface/stream.m3u8",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/vnd.apple.mpegurl"
        );
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-cache"
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), COMPLETE_PLAYLIST.as_bytes());
    }

    #[tokio::test]
    async fn test_hls_segment_supports_ranges() {
        let root = TempDir::new().unwrap();
        let state = test_state(&root);
        complete_artifact(&state, "feedfacefeedface");

        let request = Request::builder()
            .uri("/hls/feedfacefeedface/seg00000.ts")
            .header(header::RANGE, "bytes=2-5")
            .body(Body::empty())
            .unwrap();
        let response = create_app(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "video/mp2t"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes 2-5/10"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), b"2345");
    }

    #[tokio::test]
    async fn test_video_serves_whole_file_and_ranges() {
        let root = TempDir::new().unwrap();
        let state = test_state(&root);
        fs::write(state.config.media_root.join("clip.mp4"), b"abcdefghij").unwrap();

        let response = get(create_app(state.clone()), "/video?file=clip.mp4").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "video/mp4"
        );
        assert_eq!(
            response.headers().get(header::ACCEPT_RANGES).unwrap(),
            "bytes"
        );

        let request = Request::builder()
            .uri("/video?file=clip.mp4")
            .header(header::RANGE, "bytes=-4")
            .body(Body::empty())
            .unwrap();
        let response = create_app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), b"ghij");
    }

    #[tokio::test]
    async fn test_video_rejects_bad_paths() {
        let root = TempDir::new().unwrap();
        let state = test_state(&root);

        let response = get(
            create_app(state.clone()),
            "/video?file=../../etc/shadow.mp4",
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = get(create_app(state), "/video?file=").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_play_decision_for_native_mp4() {
        let root = TempDir::new().unwrap();
        let state = test_state(&root);
        fs::write(state.config.media_root.join("clip.mp4"), b"tiny").unwrap();

        let response = get(create_app(state), "/api/play?file=clip.mp4").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["use_hls"], false);
        assert_eq!(json["video_url"], "/video?file=clip.mp4");
    }

    #[tokio::test]
    async fn test_play_decision_for_mkv_starts_hls_job() {
        let root = TempDir::new().unwrap();
        let state = test_state(&root);
        let video = state.config.media_root.join("show.mkv");
        fs::write(&video, b"matroska-ish").unwrap();

        let response = get(create_app(state), "/api/play?file=show.mkv").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["use_hls"], true);
        let key = media_key(&video);
        assert_eq!(json["hls_key"], key);
        assert_eq!(json["playlist_url"], format!("/hls/{}/stream.m3u8", key));
    }

    #[tokio::test]
    async fn test_play_missing_file_is_not_found() {
        let root = TempDir::new().unwrap();
        let state = test_state(&root);

        let response = get(create_app(state), "/api/play?file=ghost.mkv").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
