use crate::error::{CoreError, CoreResult};
use crate::fingerprint::media_key;
use crate::probe;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

const MB: u64 = 1024 * 1024;
const GB: u64 = 1024 * MB;

/// One playable file found under the media root.
#[derive(Debug, Clone, Serialize)]
pub struct VideoFile {
    /// Display name (file stem).
    pub name: String,
    /// Path relative to the media root; the `file=` parameter clients send
    /// back.
    pub rel_path: String,
    pub size: u64,
    pub size_str: String,
    /// `H:MM:SS` when known; filled in from the duration cache.
    pub duration: Option<String>,
}

/// Recursive scanner for the media root.
#[derive(Debug, Clone)]
pub struct MediaScanner {
    /// Supported video file extensions.
    pub video_extensions: Vec<String>,
    /// Whether to follow symbolic links.
    pub follow_links: bool,
}

impl Default for MediaScanner {
    fn default() -> Self {
        Self {
            video_extensions: vec![
                "mp4".to_string(),
                "mkv".to_string(),
                "avi".to_string(),
                "mov".to_string(),
                "webm".to_string(),
                "m4v".to_string(),
                "wmv".to_string(),
                "flv".to_string(),
            ],
            follow_links: false,
        }
    }
}

impl MediaScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Check if a file is a supported video based on its extension.
    pub fn is_video_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.video_extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    /// Walk the media root and return every video file, sorted by name.
    /// Hidden files and directories are skipped.
    pub fn scan_directory<P: AsRef<Path>>(&self, root_path: P) -> CoreResult<Vec<VideoFile>> {
        let root_path = root_path.as_ref();

        if !root_path.exists() {
            return Err(CoreError::NoSuchMedia {
                path: root_path.to_path_buf(),
            });
        }
        if !root_path.is_dir() {
            return Err(CoreError::UnusableSource {
                path: root_path.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        let walker = WalkDir::new(root_path)
            .follow_links(self.follow_links)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        let mut videos = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("error walking media directory: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_dir() || !self.is_video_file(entry.path()) {
                continue;
            }

            let Ok(meta) = entry.metadata() else {
                continue;
            };
            let path = entry.path();
            let rel_path = path
                .strip_prefix(root_path)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned();
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| rel_path.clone());

            debug!("found video file: {} ({})", rel_path, meta.len());
            videos.push(VideoFile {
                name,
                rel_path,
                size: meta.len(),
                size_str: format_size(meta.len()),
                duration: None,
            });
        }

        videos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(videos)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Probe the formatted duration for one video, caching the result as a
/// small text file keyed by the video's fingerprint. A modified file gets a
/// new key, so stale entries are simply never read again.
pub async fn cached_duration(
    ffprobe: &str,
    cache_dir: &Path,
    video_path: &Path,
) -> Option<String> {
    let marker = cache_dir.join(format!("{}.dur", media_key(video_path)));

    if let Ok(text) = tokio::fs::read_to_string(&marker).await {
        let text = text.trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    let secs = probe::container_duration(ffprobe, video_path).await?;
    let formatted = format_duration(secs);

    let _ = tokio::fs::create_dir_all(cache_dir).await;
    let _ = tokio::fs::write(&marker, &formatted).await;

    Some(formatted)
}

/// `H:MM:SS` above an hour, `M:SS` below.
pub fn format_duration(secs: f64) -> String {
    let total = secs.round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Human-readable size: tenths of GB above 1 GiB, whole MB below.
pub fn format_size(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else {
        format!("{:.0} MB", bytes as f64 / MB as f64)
    }
}
