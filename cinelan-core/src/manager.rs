use crate::error::{CoreError, CoreResult};
use crate::fingerprint::media_key;
use crate::job::HlsJob;
use crate::playback::hls_mode;
use crate::{probe, runner, store};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// How often the reaper sweeps the registry.
const REAP_INTERVAL: Duration = Duration::from_secs(10);

/// Jobs untouched for longer than this are evicted from the registry.
const IDLE_TIMEOUT_SECS: u64 = 60;

/// Process-wide registry of HLS jobs and owner of the on-disk cache root.
///
/// One mutex guards the key → job map; the admission decision in
/// [`get_or_start`](Self::get_or_start) runs entirely inside it so two
/// concurrent requests for the same file can never both launch a
/// transcoder. Per-job flags are atomics, so the reaper reads access times
/// without taking the map lock per job.
pub struct HlsManager {
    cache_root: PathBuf,
    ffmpeg_path: String,
    ffprobe_path: String,
    /// Shared with runner-supervision tasks, which drop failed jobs.
    jobs: Arc<Mutex<HashMap<String, Arc<HlsJob>>>>,
    /// Base of the monotonic clock used for `last_access`.
    epoch: Instant,
}

impl HlsManager {
    pub fn new(
        cache_root: impl Into<PathBuf>,
        ffmpeg_path: impl Into<String>,
        ffprobe_path: impl Into<String>,
    ) -> Self {
        Self {
            cache_root: cache_root.into(),
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
            jobs: Arc::new(Mutex::new(HashMap::new())),
            epoch: Instant::now(),
        }
    }

    /// Create the cache root (mode 0755 on unix).
    pub fn init(&self) -> CoreResult<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            std::fs::DirBuilder::new()
                .recursive(true)
                .mode(0o755)
                .create(&self.cache_root)?;
        }
        #[cfg(not(unix))]
        std::fs::create_dir_all(&self.cache_root)?;

        info!("HLS cache root: {}", self.cache_root.display());
        Ok(())
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Seconds on the manager's monotonic clock.
    fn now_secs(&self) -> u64 {
        self.epoch.elapsed().as_secs()
    }

    /// Return the job for a file, adopting a complete on-disk artifact or
    /// launching a new transcoder as needed.
    ///
    /// The whole admission decision happens under the registry lock:
    /// existing entry, cache adoption, directory creation, codec probe,
    /// transcoder spawn and job insertion. The spawn precedes insertion so
    /// a registered job always carries its child's pid; only the transcode
    /// run itself proceeds outside the lock.
    pub async fn get_or_start(&self, path: &Path) -> CoreResult<Arc<HlsJob>> {
        let key = media_key(path);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut jobs = self.jobs.lock().await;
        if let Some(job) = jobs.get(&key) {
            return Ok(job.clone());
        }

        let dir = store::artifact_dir(&self.cache_root, &key);
        if store::is_complete(&dir) {
            info!("{}: cache hit ({})", file_name, key);
            let job = Arc::new(HlsJob::adopted(key.clone(), dir, self.now_secs()));
            jobs.insert(key, job.clone());
            return Ok(job);
        }

        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            CoreError::Admission {
                key: key.clone(),
                reason: format!("cannot create cache directory {}: {e}", dir.display()),
            }
        })?;

        let codec = probe::video_codec(&self.ffprobe_path, path).await;
        let mode = hls_mode(&codec);
        info!("{}: video codec '{}' -> {:?} ({})", file_name, codec, mode, key);

        let args = runner::build_args(mode, path, &dir);
        let child = match runner::command(&self.ffmpeg_path, &args).spawn() {
            Ok(child) => child,
            Err(e) => {
                let _ = tokio::fs::remove_dir_all(&dir).await;
                return Err(CoreError::Admission {
                    key,
                    reason: format!("cannot spawn transcoder: {e}"),
                });
            }
        };

        let job = Arc::new(HlsJob::started(
            key.clone(),
            dir,
            child.id(),
            self.now_secs(),
        ));
        jobs.insert(key.clone(), job.clone());
        drop(jobs);

        self.supervise(child, job.clone(), file_name);
        Ok(job)
    }

    /// Wait out an already-spawned transcoder on its own task. Success
    /// marks the job cached; failure discards the partial artifact and
    /// drops the registry entry so a retry re-enters admission cleanly.
    /// Either way the job's done signal fires last.
    fn supervise(&self, mut child: tokio::process::Child, job: Arc<HlsJob>, file_name: String) {
        let jobs = Arc::clone(&self.jobs);
        tokio::spawn(async move {
            let failed = match child.wait().await {
                Ok(status) if status.success() => {
                    info!("{}: transcode complete, cached ({})", file_name, job.key);
                    job.mark_cached();
                    false
                }
                Ok(status) => {
                    warn!("{}: transcoder exited with {}", file_name, status);
                    true
                }
                Err(e) => {
                    error!("{}: failed to wait for transcoder: {}", file_name, e);
                    true
                }
            };

            if failed {
                // Never leave a partial rendition where a later run could
                // mistake it for a finished one.
                if let Err(e) = tokio::fs::remove_dir_all(&job.dir).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!("failed to remove {}: {}", job.dir.display(), e);
                    }
                }
                jobs.lock().await.remove(&job.key);
            }

            job.mark_done();
        });
    }

    /// Refresh a job's last-access time.
    pub async fn touch(&self, key: &str) {
        let jobs = self.jobs.lock().await;
        if let Some(job) = jobs.get(key) {
            job.touch(self.now_secs());
        }
    }

    /// Resolve the directory artifact requests for `key` should read from:
    /// the registry entry if one exists, otherwise a complete on-disk cache.
    pub async fn resolve_dir(&self, key: &str) -> Option<PathBuf> {
        if let Some(job) = self.jobs.lock().await.get(key) {
            return Some(job.dir.clone());
        }
        let dir = store::artifact_dir(&self.cache_root, key);
        store::is_complete(&dir).then_some(dir)
    }

    /// Evict a job from the registry. A live, uncached transcoder is killed
    /// and its partial artifact removed; a completed artifact stays on disk
    /// so the next request adopts it instantly.
    pub async fn stop(&self, key: &str) {
        let job = { self.jobs.lock().await.remove(key) };
        let Some(job) = job else { return };

        if let Some(pid) = job.pid() {
            if !job.is_cached() {
                if !job.is_done() {
                    info!("stopping idle transcode job {}", key);
                    kill_process(pid);
                }
                if let Err(e) = tokio::fs::remove_dir_all(&job.dir).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!("failed to remove {}: {}", job.dir.display(), e);
                    }
                }
            }
        }
    }

    /// Keys whose last access is further in the past than the idle timeout.
    async fn collect_idle(&self, now_secs: u64) -> Vec<String> {
        let jobs = self.jobs.lock().await;
        jobs.iter()
            .filter(|(_, job)| now_secs.saturating_sub(job.last_access()) > IDLE_TIMEOUT_SECS)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Periodic sweeper evicting idle jobs. Collection happens under the
    /// registry lock; the stops run outside it.
    pub fn start_reaper(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let manager = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(REAP_INTERVAL);
            loop {
                ticker.tick().await;
                let idle = manager.collect_idle(manager.now_secs()).await;
                for key in idle {
                    manager.stop(&key).await;
                }
            }
        })
    }

    /// Remove the entire cache subtree. The registry map is not rewritten;
    /// callers must exit the process right after a wipe rather than keep
    /// serving from stale in-memory jobs.
    pub async fn wipe(&self) -> CoreResult<()> {
        info!("wiping HLS cache at {}", self.cache_root.display());
        match tokio::fs::remove_dir_all(&self.cache_root).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn kill_process(pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        warn!("failed to kill transcoder pid {}: {}", pid, e);
    }
}

#[cfg(windows)]
fn kill_process(pid: u32) {
    use std::process::Command;

    if let Err(e) = Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/F"])
        .status()
    {
        warn!("failed to kill transcoder pid {}: {}", pid, e);
    }
}
