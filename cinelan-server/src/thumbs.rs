use anyhow::{anyhow, Result};
use cinelan_core::media_key;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Shown when a frame cannot be extracted from a video.
pub const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="320" height="180" viewBox="0 0 320 180"><rect width="320" height="180" fill="#1f2430"/><polygon points="135,60 135,120 195,90" fill="#4a5568"/></svg>"##;

/// Generates and caches video thumbnails with the ffmpeg binary.
///
/// Thumbnails are keyed by the same path+mtime fingerprint as HLS
/// artifacts, so an edited file naturally gets a fresh frame grab.
pub struct ThumbnailService {
    cache_dir: PathBuf,
    ffmpeg_path: String,
}

impl ThumbnailService {
    pub fn new(cache_dir: PathBuf, ffmpeg_path: String) -> Self {
        Self {
            cache_dir,
            ffmpeg_path,
        }
    }

    /// Cache path for a video's thumbnail.
    pub fn thumb_path(&self, video: &Path) -> PathBuf {
        self.cache_dir.join(format!("{}.jpg", media_key(video)))
    }

    /// Return the cached thumbnail for a video, extracting one first if
    /// needed.
    pub async fn get_or_generate(&self, video: &Path) -> Result<PathBuf> {
        let out = self.thumb_path(video);
        if thumb_usable(&out).await {
            return Ok(out);
        }

        tokio::fs::create_dir_all(&self.cache_dir).await?;

        // Strategies in order: seek 5 seconds in, grab the first frame
        // (clips shorter than 5 s), then both again with enlarged probing
        // for files with sparse header information.
        let attempts: [Vec<&str>; 4] = [
            vec!["-ss", "5"],
            vec![],
            vec![
                "-analyzeduration",
                "20000000",
                "-probesize",
                "50000000",
                "-ss",
                "5",
            ],
            vec!["-analyzeduration", "20000000", "-probesize", "50000000"],
        ];

        for prefix in attempts {
            let status = Command::new(&self.ffmpeg_path)
                .args(&prefix)
                .arg("-i")
                .arg(video)
                .args(["-vframes", "1", "-vf", "scale=320:-2", "-q:v", "6", "-y"])
                .arg(&out)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;

            match status {
                Ok(status) if status.success() => {
                    if thumb_usable(&out).await {
                        debug!("thumbnail cached for {}", video.display());
                        return Ok(out);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("failed to run ffmpeg for thumbnail: {}", e);
                    break;
                }
            }
        }

        Err(anyhow!(
            "thumbnail extraction failed for {}",
            video.display()
        ))
    }
}

async fn thumb_usable(path: &Path) -> bool {
    matches!(tokio::fs::metadata(path).await, Ok(meta) if meta.len() > 0)
}
