//! Where album track lists come from.
//!
//! The streaming service login and API stay outside this crate; what arrives
//! here is an already resolved album manifest.

use serde::{Deserialize, Deserializer};
use std::path::Path;
use thiserror::Error;
use url::Url;

use avtransport::PlayableTrack;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid manifest: {0}")]
    Invalid(String),

    #[error("Album {0} is not in this catalog")]
    UnknownAlbum(String),
}

/// Source of an album's playable tracks.
pub trait Catalog {
    /// Tracks of `album_id` in album order.
    fn album(&self, album_id: &str) -> Result<Vec<PlayableTrack>, CatalogError>;
}

/// An album described by a JSON manifest.
///
/// ```json
/// {
///   "album_id": "77646164",
///   "title": "Kind of Blue",
///   "artist": "Miles Davis",
///   "cover_url": "https://resources.example.com/kob/640x640.jpg",
///   "tracks": [
///     { "id": 77646169, "track_num": 1, "title": "So What",
///       "duration": 562, "stream_url": "https://cdn.example.com/1.flac" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AlbumManifest {
    #[serde(deserialize_with = "string_or_number")]
    pub album_id: String,
    pub title: String,
    pub artist: String,
    pub cover_url: String,
    pub tracks: Vec<ManifestTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestTrack {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub track_num: u32,
    pub title: String,
    /// Seconds
    pub duration: u32,
    pub stream_url: String,
    /// Overrides the album artist for this track
    #[serde(default)]
    pub artist: Option<String>,
}

/// Service ids show up both as JSON numbers and strings.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

/// Catalog backed by a single validated album manifest.
#[derive(Debug, Clone)]
pub struct ManifestCatalog {
    manifest: AlbumManifest,
}

impl ManifestCatalog {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let mut manifest: AlbumManifest = serde_json::from_str(text)?;
        validate(&manifest)?;
        manifest.tracks.sort_by_key(|t| t.track_num);
        Ok(Self { manifest })
    }

    pub fn album_id(&self) -> &str {
        &self.manifest.album_id
    }

    pub fn manifest(&self) -> &AlbumManifest {
        &self.manifest
    }
}

impl Catalog for ManifestCatalog {
    fn album(&self, album_id: &str) -> Result<Vec<PlayableTrack>, CatalogError> {
        if album_id != self.manifest.album_id {
            return Err(CatalogError::UnknownAlbum(album_id.to_string()));
        }

        let album = &self.manifest;
        Ok(album
            .tracks
            .iter()
            .map(|t| PlayableTrack {
                id: t.id.clone(),
                index_in_album: t.track_num,
                title: t.title.clone(),
                artist: t.artist.clone().unwrap_or_else(|| album.artist.clone()),
                album_title: album.title.clone(),
                album_id: album.album_id.clone(),
                cover_url: album.cover_url.clone(),
                duration_seconds: t.duration,
                stream_url: t.stream_url.clone(),
            })
            .collect())
    }
}

/// Ids become path segments of the media URLs, so they must be plain.
fn check_segment(kind: &str, value: &str) -> Result<(), CatalogError> {
    if value.is_empty() || value.starts_with('.') || value.contains(['/', '\\', '?', '#']) {
        return Err(CatalogError::Invalid(format!("{} {:?} is not a usable path segment", kind, value)));
    }
    Ok(())
}

fn check_absolute_url(kind: &str, value: &str) -> Result<(), CatalogError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(CatalogError::Invalid(format!("{} has unsupported scheme {}", kind, url.scheme()))),
        Err(e) => Err(CatalogError::Invalid(format!("{} {:?} is not an absolute URL: {}", kind, value, e))),
    }
}

fn validate(manifest: &AlbumManifest) -> Result<(), CatalogError> {
    check_segment("album_id", &manifest.album_id)?;
    check_absolute_url("cover_url", &manifest.cover_url)?;
    if manifest.tracks.is_empty() {
        return Err(CatalogError::Invalid("album has no tracks".to_string()));
    }

    let mut seen = std::collections::HashSet::new();
    for track in &manifest.tracks {
        check_segment("track id", &track.id)?;
        check_absolute_url("stream_url", &track.stream_url)?;
        if !seen.insert(track.id.as_str()) {
            return Err(CatalogError::Invalid(format!("duplicate track id {}", track.id)));
        }
    }
    Ok(())
}
