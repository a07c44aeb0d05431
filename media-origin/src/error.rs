use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the download cache and the media server
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fetching a track from its stream URL failed
    #[error("Download of {url} failed: {message}")]
    Download { url: String, message: String },

    /// The HTTP listener could not be bound
    #[error("Failed to bind media server: {0}")]
    Bind(String),

    /// The track did not become ready before the deadline
    #[error("Track {path} not ready after {waited_secs}s")]
    NotReady { path: String, waited_secs: u64 },

    /// The track's download failed, so it will never be served
    #[error("Track {path} could not be downloaded")]
    Unavailable { path: String },

    #[error("Invalid cache path: {0}")]
    InvalidPath(PathBuf),
}

pub type Result<T> = std::result::Result<T, MediaError>;
