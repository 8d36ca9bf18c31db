use crate::config::Config;
use crate::thumbs::ThumbnailService;
use cinelan_core::{HlsManager, MediaScanner};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub hls: Arc<HlsManager>,
    pub thumbs: Arc<ThumbnailService>,
    pub scanner: MediaScanner,
}

impl AppState {
    pub fn new(config: Arc<Config>, hls: Arc<HlsManager>) -> Self {
        let thumbs = Arc::new(ThumbnailService::new(
            config.thumb_cache_dir.clone(),
            config.ffmpeg_path.clone(),
        ));
        Self {
            config,
            hls,
            thumbs,
            scanner: MediaScanner::new(),
        }
    }
}
