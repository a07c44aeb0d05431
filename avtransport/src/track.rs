//! Playable tracks and the media origin URL scheme.

use std::net::{IpAddr, SocketAddr};

/// One track of an album, as handed over by the catalog.
///
/// Read-only for the control point. `stream_url` and `cover_url` are
/// absolute URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableTrack {
    pub id: String,
    pub index_in_album: u32,
    pub title: String,
    pub artist: String,
    pub album_title: String,
    pub album_id: String,
    pub cover_url: String,
    pub duration_seconds: u32,
    pub stream_url: String,
}

impl PlayableTrack {
    /// Path of the cached file relative to the media root: `{album_id}/{id}.flac`.
    pub fn cache_path(&self) -> String {
        track_path(&self.album_id, &self.id)
    }
}

/// `{album_id}/{track_id}.flac`, the routing the media origin server exposes.
pub fn track_path(album_id: &str, track_id: &str) -> String {
    format!("{}/{}.flac", album_id, track_id)
}

/// Where the renderer fetches cached audio from.
///
/// `local_ip` must be the address of this host as seen by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaOrigin {
    pub local_ip: IpAddr,
    pub port: u16,
}

impl MediaOrigin {
    pub fn new(local_ip: IpAddr, port: u16) -> Self {
        Self { local_ip, port }
    }

    /// `http://{ip}:{port}`
    pub fn base_url(&self) -> String {
        format!("http://{}", SocketAddr::new(self.local_ip, self.port))
    }

    /// `http://{ip}:{port}/{album_id}/{id}.flac`
    pub fn track_url(&self, track: &PlayableTrack) -> String {
        format!("{}/{}", self.base_url(), track.cache_path())
    }
}
