use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::watch;

/// One active or resident HLS rendition.
///
/// A job is created either when a transcoder has been launched for a file
/// or when a completed artifact directory is adopted from disk after a
/// restart. The pid is fixed at construction, before the job is inserted
/// into the registry, so no caller can ever observe a registered job whose
/// child is untracked. The registry hands out shared handles; the runner
/// task and the reaper mutate the flags through atomics so readers never
/// need the registry lock.
pub struct HlsJob {
    /// Fingerprint key; also the artifact directory name.
    pub key: String,
    /// Absolute path of the artifact directory.
    pub dir: PathBuf,
    /// Pid of the transcoder child. `None` for jobs adopted from a
    /// complete on-disk cache.
    pid: Option<u32>,
    /// One-shot completion signal, observable by any number of waiters.
    done: watch::Sender<bool>,
    /// True once the artifact is complete and will not be re-run.
    cached: AtomicBool,
    /// Monotonic seconds of the most recent access.
    last_access: AtomicU64,
}

impl HlsJob {
    /// Job for a freshly spawned transcode.
    pub(crate) fn started(key: String, dir: PathBuf, pid: Option<u32>, now_secs: u64) -> Self {
        let (done, _) = watch::channel(false);
        Self {
            key,
            dir,
            pid,
            done,
            cached: AtomicBool::new(false),
            last_access: AtomicU64::new(now_secs),
        }
    }

    /// Job synthesized from a complete artifact already on disk: no child
    /// process, completion pre-fired, nothing left to run.
    pub(crate) fn adopted(key: String, dir: PathBuf, now_secs: u64) -> Self {
        let (done, _) = watch::channel(true);
        Self {
            key,
            dir,
            pid: None,
            done,
            cached: AtomicBool::new(true),
            last_access: AtomicU64::new(now_secs),
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn is_cached(&self) -> bool {
        self.cached.load(Ordering::Acquire)
    }

    pub(crate) fn mark_cached(&self) {
        self.cached.store(true, Ordering::Release);
    }

    pub fn is_done(&self) -> bool {
        *self.done.borrow()
    }

    pub(crate) fn mark_done(&self) {
        self.done.send_replace(true);
    }

    /// Wait until the transcoder has exited (or has already exited).
    pub async fn wait_done(&self) {
        let mut rx = self.done.subscribe();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }

    pub fn last_access(&self) -> u64 {
        self.last_access.load(Ordering::Relaxed)
    }

    pub fn touch(&self, now_secs: u64) {
        self.last_access.store(now_secs, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adopted_job_is_done_and_cached() {
        let job = HlsJob::adopted("k".into(), "/tmp/k".into(), 7);
        assert!(job.is_done());
        assert!(job.is_cached());
        assert!(job.pid().is_none());
        assert_eq!(job.last_access(), 7);
    }

    #[test]
    fn test_started_job_lifecycle() {
        let job = HlsJob::started("k".into(), "/tmp/k".into(), Some(1234), 0);
        assert!(!job.is_done());
        assert!(!job.is_cached());
        assert_eq!(job.pid(), Some(1234));

        job.mark_cached();
        job.mark_done();
        assert!(job.is_cached());
        assert!(job.is_done());
    }

    #[tokio::test]
    async fn test_wait_done_observes_pre_fired_signal() {
        let job = HlsJob::adopted("k".into(), "/tmp/k".into(), 0);
        // Must return immediately rather than hang.
        job.wait_done().await;
    }

    #[tokio::test]
    async fn test_many_waiters_see_one_signal() {
        let job = std::sync::Arc::new(HlsJob::started("k".into(), "/tmp/k".into(), None, 0));

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let job = job.clone();
                tokio::spawn(async move { job.wait_done().await })
            })
            .collect();

        job.mark_done();
        for waiter in waiters {
            waiter.await.unwrap();
        }
    }

    #[test]
    fn test_touch_updates_last_access() {
        let job = HlsJob::started("k".into(), "/tmp/k".into(), None, 1);
        job.touch(42);
        assert_eq!(job.last_access(), 42);
    }
}
