use std::env;
use std::path::PathBuf;

/// Server configuration loaded from environment variables, with CLI
/// overrides applied in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Media settings
    pub media_root: PathBuf,
    pub hls_cache_dir: PathBuf,
    pub thumb_cache_dir: PathBuf,

    // FFmpeg settings
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenv::dotenv().ok();

        let cache_base = env::var("CACHE_DIR").map(PathBuf::from).unwrap_or_else(|_| {
            dirs::cache_dir()
                .unwrap_or_else(env::temp_dir)
                .join("cinelan")
        });

        let media_root = env::var("MEDIA_ROOT").map(PathBuf::from).unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Movies")
        });

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            media_root,
            hls_cache_dir: cache_base.join("hls"),
            thumb_cache_dir: cache_base.join("thumbs"),

            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
        })
    }

    /// Create the cache directories if they don't exist. The HLS cache root
    /// itself is owned by the job manager's init.
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.thumb_cache_dir)?;
        Ok(())
    }
}
