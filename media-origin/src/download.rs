//! Background album downloader.
//!
//! Tracks are fetched one after another on a dedicated thread. Each file is
//! streamed into `{id}.flac.part` and renamed once complete, so the server
//! never sees a truncated `.flac`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

use avtransport::PlayableTrack;

use crate::cache::MediaCache;
use crate::error::{MediaError, Result};

/// Settings for the download worker.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Deadline for each whole track transfer
    /// Default: 10 minutes
    pub request_timeout: Duration,

    /// Reuse files already present from an earlier run
    /// Default: true
    pub reuse_existing: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(600),
            reuse_existing: true,
        }
    }
}

/// What the worker did, returned when its thread finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub reused: usize,
    pub failed: usize,
}

pub struct Downloader {
    cache: MediaCache,
    config: DownloadConfig,
}

impl Downloader {
    pub fn new(cache: MediaCache, config: DownloadConfig) -> Self {
        Self { cache, config }
    }

    /// Mark every track `Pending`, then download them in order on a new thread.
    ///
    /// The index is populated before this returns, so the server answers 503
    /// rather than 404 for tracks that are merely queued.
    pub fn spawn(self, tracks: Vec<PlayableTrack>) -> Result<JoinHandle<DownloadReport>> {
        self.cache.ensure_root()?;
        for track in &tracks {
            self.cache.index().mark_pending(&track.cache_path());
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|e| MediaError::Download {
                url: String::new(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let handle = thread::Builder::new()
            .name("gapless-download".to_string())
            .spawn(move || self.run(&client, &tracks))?;
        Ok(handle)
    }

    fn run(&self, client: &reqwest::blocking::Client, tracks: &[PlayableTrack]) -> DownloadReport {
        let mut report = DownloadReport::default();
        for track in tracks {
            let path = track.cache_path();
            if self.config.reuse_existing && self.cache.file_path(track).is_file() {
                debug!(%path, "reusing cached track");
                self.cache.index().mark_ready(&path);
                report.reused += 1;
                continue;
            }

            match self.fetch(client, track) {
                Ok(bytes) => {
                    info!(%path, bytes, title = %track.title, "track downloaded");
                    self.cache.index().mark_ready(&path);
                    report.downloaded += 1;
                }
                Err(e) => {
                    warn!(%path, error = %e, "track download failed");
                    let _ = std::fs::remove_file(self.cache.partial_path(track));
                    self.cache.index().mark_failed(&path);
                    report.failed += 1;
                }
            }
        }
        report
    }

    fn fetch(&self, client: &reqwest::blocking::Client, track: &PlayableTrack) -> Result<u64> {
        let download_error = |message: String| MediaError::Download {
            url: track.stream_url.clone(),
            message,
        };

        let partial = self.cache.partial_path(track);
        if let Some(dir) = partial.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let mut response = client
            .get(&track.stream_url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| download_error(e.to_string()))?;

        let mut writer = BufWriter::new(File::create(&partial)?);
        let bytes = response
            .copy_to(&mut writer)
            .map_err(|e| download_error(e.to_string()))?;
        writer.flush()?;
        drop(writer);

        std::fs::rename(&partial, self.cache.file_path(track))?;
        Ok(bytes)
    }
}
