//! Runtime settings threaded through the player.

use std::path::PathBuf;
use std::time::Duration;

use soap_client::SoapConfig;

use crate::error::PlayerError;

/// Everything the player needs to know up front.
///
/// Built once (defaults, then CLI overrides) and passed by reference; there
/// is no process-wide configuration.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Port of the media origin server
    /// Default: 8000
    pub port: u16,

    /// Root of the download cache
    /// Default: `{user cache dir}/gapless`
    pub cache_dir: PathBuf,

    /// How long SSDP answers are collected
    /// Default: 3 seconds
    pub discovery_timeout: Duration,

    /// Deadline for each SOAP call
    /// Default: 10 seconds
    pub soap_timeout: Duration,

    /// Sleep between position polls
    /// Default: 1 second
    pub poll_interval: Duration,

    /// Sleep after queueing the next track
    /// Default: 3 seconds
    pub advance_interval: Duration,

    /// Queue the next track this many seconds before the current one ends
    /// Default: 2
    pub lead_seconds: u32,

    /// The last track counts as finished this many seconds before its end
    /// Default: 1
    pub end_tolerance_seconds: u32,

    /// Abort after this many failed ticks in a row; 0 never aborts
    /// Default: 10
    pub max_consecutive_failures: u32,

    /// How long to wait for the first track's download before starting
    /// Default: 120 seconds
    pub first_track_timeout: Duration,

    /// Send `SetPlayMode NORMAL` before starting
    /// Default: false
    pub set_play_mode: bool,

    /// Leave downloaded files in place when closing
    /// Default: false
    pub keep_cache: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            cache_dir: default_cache_dir(),
            discovery_timeout: Duration::from_secs(3),
            soap_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
            advance_interval: Duration::from_secs(3),
            lead_seconds: 2,
            end_tolerance_seconds: 1,
            max_consecutive_failures: 10,
            first_track_timeout: Duration::from_secs(120),
            set_play_mode: false,
            keep_cache: false,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("gapless")
}

impl PlayerConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    pub fn with_soap_timeout(mut self, timeout: Duration) -> Self {
        self.soap_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_advance_interval(mut self, interval: Duration) -> Self {
        self.advance_interval = interval;
        self
    }

    pub fn with_lead_seconds(mut self, seconds: u32) -> Self {
        self.lead_seconds = seconds;
        self
    }

    pub fn with_end_tolerance_seconds(mut self, seconds: u32) -> Self {
        self.end_tolerance_seconds = seconds;
        self
    }

    pub fn with_max_consecutive_failures(mut self, failures: u32) -> Self {
        self.max_consecutive_failures = failures;
        self
    }

    pub fn with_first_track_timeout(mut self, timeout: Duration) -> Self {
        self.first_track_timeout = timeout;
        self
    }

    pub fn with_set_play_mode(mut self, enabled: bool) -> Self {
        self.set_play_mode = enabled;
        self
    }

    pub fn with_keep_cache(mut self, keep: bool) -> Self {
        self.keep_cache = keep;
        self
    }

    /// SOAP timeouts derived from `soap_timeout`.
    pub fn soap_config(&self) -> SoapConfig {
        SoapConfig {
            connect_timeout: self.soap_timeout.min(SoapConfig::default().connect_timeout),
            request_timeout: self.soap_timeout,
        }
    }

    /// Reject settings the playback loop cannot work with.
    pub fn validate(&self) -> Result<(), PlayerError> {
        if self.poll_interval.is_zero() {
            return Err(PlayerError::Config("poll interval must be non-zero".to_string()));
        }
        if self.soap_timeout.is_zero() {
            return Err(PlayerError::Config("SOAP timeout must be non-zero".to_string()));
        }
        if self.lead_seconds < self.end_tolerance_seconds {
            return Err(PlayerError::Config(format!(
                "lead ({}s) must not be shorter than the end tolerance ({}s)",
                self.lead_seconds, self.end_tolerance_seconds
            )));
        }
        Ok(())
    }
}
