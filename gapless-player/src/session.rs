//! One album being played on one renderer.

use std::time::Duration;

use avtransport::{MediaOrigin, PlayableTrack};

use crate::error::PlayerError;

/// The track list plus the cursor of the track currently playing.
///
/// The cursor only moves forward.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    tracks: Vec<PlayableTrack>,
    cursor: usize,
    control_endpoint: String,
    origin: MediaOrigin,
    poll_interval: Duration,
}

impl PlaybackSession {
    pub fn new(
        tracks: Vec<PlayableTrack>,
        control_endpoint: impl Into<String>,
        origin: MediaOrigin,
        poll_interval: Duration,
    ) -> Result<Self, PlayerError> {
        if tracks.is_empty() {
            return Err(PlayerError::Config("nothing to play: track list is empty".to_string()));
        }
        Ok(Self {
            tracks,
            cursor: 0,
            control_endpoint: control_endpoint.into(),
            origin,
            poll_interval,
        })
    }

    pub fn tracks(&self) -> &[PlayableTrack] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> &PlayableTrack {
        &self.tracks[self.cursor]
    }

    pub fn track(&self, index: usize) -> Option<&PlayableTrack> {
        self.tracks.get(index)
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.tracks.len()
    }

    /// Move the cursor to `index`; moving backwards or past the end is ignored.
    pub fn advance_to(&mut self, index: usize) {
        if index > self.cursor && index < self.tracks.len() {
            self.cursor = index;
        }
    }

    pub fn control_endpoint(&self) -> &str {
        &self.control_endpoint
    }

    pub fn origin(&self) -> &MediaOrigin {
        &self.origin
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}
