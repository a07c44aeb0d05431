//! Local media origin for gapless playback.
//!
//! Renderers pull audio over HTTP from the control point, so the album is
//! first copied into a local cache and then served from there.
//!
//! # Overview
//!
//! - [`MediaCache`]: the cache directory plus a [`CacheIndex`] recording
//!   whether each track is pending, ready or failed.
//! - [`Downloader`]: a worker thread fetching tracks in album order into the
//!   cache.
//! - [`MediaServer`]: a warp server exposing the cache as
//!   `http://{ip}:{port}/{album_id}/{id}.flac`, refusing tracks that are not
//!   ready yet.
//!
//! The index is the only thing the two workers share; the renderer sees a
//! track appear as soon as its download has been renamed into place.

pub mod cache;
pub mod download;
pub mod error;
pub mod server;

pub use cache::{CacheIndex, MediaCache, TrackStatus};
pub use download::{DownloadConfig, DownloadReport, Downloader};
pub use error::{MediaError, Result};
pub use server::{MediaServer, ServerConfig};
