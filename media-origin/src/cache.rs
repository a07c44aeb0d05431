//! Download bookkeeping shared between the downloader and the HTTP server.

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use avtransport::PlayableTrack;

use crate::error::{MediaError, Result};

/// Where a track stands in the download pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStatus {
    /// Queued or downloading; the file is not servable yet
    Pending,
    /// Complete file in place
    Ready,
    /// Download gave up; never served
    Failed,
}

/// Shared map of relative cache path (`{album_id}/{id}.flac`) to status.
///
/// Cloning is cheap and every clone observes the same entries.
#[derive(Debug, Clone, Default)]
pub struct CacheIndex {
    inner: Arc<IndexInner>,
}

#[derive(Debug, Default)]
struct IndexInner {
    entries: Mutex<HashMap<String, TrackStatus>>,
    changed: Condvar,
}

impl CacheIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, path: &str) -> Option<TrackStatus> {
        self.inner.entries.lock().get(path).copied()
    }

    pub fn mark_pending(&self, path: &str) {
        self.set(path, TrackStatus::Pending);
    }

    pub fn mark_ready(&self, path: &str) {
        self.set(path, TrackStatus::Ready);
    }

    pub fn mark_failed(&self, path: &str) {
        self.set(path, TrackStatus::Failed);
    }

    fn set(&self, path: &str, status: TrackStatus) {
        self.inner.entries.lock().insert(path.to_string(), status);
        self.inner.changed.notify_all();
    }

    /// Forget every entry under `{album_id}/`.
    pub fn remove_album(&self, album_id: &str) {
        let prefix = format!("{}/", album_id);
        self.inner
            .entries
            .lock()
            .retain(|path, _| !path.starts_with(&prefix));
        self.inner.changed.notify_all();
    }

    /// Block until `path` is `Ready`.
    ///
    /// Returns `Unavailable` as soon as the download is marked failed and
    /// `NotReady` when `timeout` elapses first.
    pub fn wait_ready(&self, path: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        let mut entries = self.inner.entries.lock();
        loop {
            match entries.get(path) {
                Some(TrackStatus::Ready) => return Ok(()),
                Some(TrackStatus::Failed) => {
                    return Err(MediaError::Unavailable {
                        path: path.to_string(),
                    })
                }
                Some(TrackStatus::Pending) | None => {}
            }
            if self
                .inner
                .changed
                .wait_until(&mut entries, deadline)
                .timed_out()
            {
                // A final look: the notify may have raced the deadline.
                return match entries.get(path) {
                    Some(TrackStatus::Ready) => Ok(()),
                    _ => Err(MediaError::NotReady {
                        path: path.to_string(),
                        waited_secs: timeout.as_secs(),
                    }),
                };
            }
        }
    }
}

/// The on-disk cache rooted at one directory, plus its index.
#[derive(Debug, Clone)]
pub struct MediaCache {
    root: PathBuf,
    index: CacheIndex,
}

impl MediaCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: CacheIndex::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index(&self) -> &CacheIndex {
        &self.index
    }

    /// Create the root directory if needed.
    pub fn ensure_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Final location of a track's file.
    pub fn file_path(&self, track: &PlayableTrack) -> PathBuf {
        self.root.join(&track.album_id).join(format!("{}.flac", track.id))
    }

    /// Location the download is written to before the rename.
    pub fn partial_path(&self, track: &PlayableTrack) -> PathBuf {
        self.root
            .join(&track.album_id)
            .join(format!("{}.flac.part", track.id))
    }

    /// Block until `track` is servable.
    pub fn wait_ready(&self, track: &PlayableTrack, timeout: Duration) -> Result<()> {
        debug!(path = %track.cache_path(), "waiting for track download");
        self.index.wait_ready(&track.cache_path(), timeout)
    }

    /// Remove the album directory and its index entries.
    ///
    /// A missing directory is not an error.
    pub fn purge(&self, album_id: &str) -> Result<()> {
        if album_id.is_empty() || album_id.contains(['/', '\\']) || album_id.starts_with('.') {
            return Err(MediaError::InvalidPath(self.root.join(album_id)));
        }
        self.index.remove_album(album_id);

        let dir = self.root.join(album_id);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => {
                info!(dir = %dir.display(), "purged album cache");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_status_transitions() {
        let index = CacheIndex::new();
        assert_eq!(index.status("1/2.flac"), None);

        index.mark_pending("1/2.flac");
        assert_eq!(index.status("1/2.flac"), Some(TrackStatus::Pending));

        index.mark_ready("1/2.flac");
        assert_eq!(index.status("1/2.flac"), Some(TrackStatus::Ready));
    }

    #[test]
    fn test_wait_ready_wakes_on_mark() {
        let index = CacheIndex::new();
        index.mark_pending("1/2.flac");

        let writer = index.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            writer.mark_ready("1/2.flac");
        });

        index.wait_ready("1/2.flac", Duration::from_secs(5)).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_ready_times_out() {
        let index = CacheIndex::new();
        index.mark_pending("1/2.flac");

        let err = index
            .wait_ready("1/2.flac", Duration::from_millis(30))
            .unwrap_err();
        assert!(matches!(err, MediaError::NotReady { .. }));
    }

    #[test]
    fn test_wait_ready_fails_fast_on_failed_download() {
        let index = CacheIndex::new();
        index.mark_failed("1/2.flac");

        let err = index
            .wait_ready("1/2.flac", Duration::from_secs(60))
            .unwrap_err();
        assert!(matches!(err, MediaError::Unavailable { .. }));
    }

    #[test]
    fn test_remove_album_only_touches_that_album() {
        let index = CacheIndex::new();
        index.mark_ready("1/a.flac");
        index.mark_ready("10/b.flac");

        index.remove_album("1");
        assert_eq!(index.status("1/a.flac"), None);
        assert_eq!(index.status("10/b.flac"), Some(TrackStatus::Ready));
    }

    #[test]
    fn test_purge_removes_album_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MediaCache::new(dir.path());
        std::fs::create_dir_all(dir.path().join("42")).unwrap();
        std::fs::write(dir.path().join("42/7.flac"), b"fLaC").unwrap();
        cache.index().mark_ready("42/7.flac");

        cache.purge("42").unwrap();
        assert!(!dir.path().join("42").exists());
        assert_eq!(cache.index().status("42/7.flac"), None);

        // Second purge is a no-op.
        cache.purge("42").unwrap();
    }

    #[test]
    fn test_purge_rejects_escaping_ids() {
        let dir = tempfile::tempdir().unwrap();
        let cache = MediaCache::new(dir.path());
        assert!(matches!(cache.purge(".."), Err(MediaError::InvalidPath(_))));
        assert!(matches!(cache.purge("a/b"), Err(MediaError::InvalidPath(_))));
        assert!(matches!(cache.purge(""), Err(MediaError::InvalidPath(_))));
    }
}
