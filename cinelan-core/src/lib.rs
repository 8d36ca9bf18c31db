//! Core of the cinelan media server: decides how each video file reaches
//! the browser and runs the on-demand HLS repackaging behind it.
//!
//! The centerpiece is [`HlsManager`], a process-wide registry that
//! coordinates at most one transcoder per input file, serves any number of
//! concurrent readers from the artifacts it writes, and keeps a persistent
//! content-addressed cache under the user cache directory. Around it sit
//! the fingerprinting, MP4 layout inspection, ffprobe probing and
//! playability classification the admission path needs, plus the media
//! directory scanner the HTTP layer lists files with.

pub mod error;
pub mod fingerprint;
pub mod job;
pub mod manager;
pub mod mp4;
pub mod playback;
pub mod probe;
pub mod scanner;
pub mod store;

mod runner;

pub use error::{CoreError, CoreResult};
pub use fingerprint::media_key;
pub use job::HlsJob;
pub use manager::HlsManager;
pub use playback::{classify, Delivery, HlsMode, LARGE_MP4_THRESHOLD};
pub use scanner::{MediaScanner, VideoFile};
