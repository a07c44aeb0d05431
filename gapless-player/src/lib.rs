//! # Gapless album playback on UPnP/DLNA renderers
//!
//! Plays an album on a network renderer without gaps between tracks by
//! queueing each next track with `SetNextAVTransportURI` just before the
//! current one ends.
//!
//! ```rust,no_run
//! use avtransport::{AvTransportClient, MediaOrigin};
//! use gapless_player::{Catalog, ManifestCatalog, Orchestrator, PlaybackSession, PlayerConfig, ThreadSleeper};
//!
//! fn main() -> Result<(), gapless_player::PlayerError> {
//!     let config = PlayerConfig::default();
//!     let catalog = ManifestCatalog::from_path("album.json")?;
//!     let tracks = catalog.album(catalog.album_id())?;
//!
//!     let endpoint = "http://192.168.1.40:49152/upnp/control/rendertransport1";
//!     let local_ip = gapless_player::net::local_ip_as_seen_by(endpoint)?;
//!     let origin = MediaOrigin::new(local_ip, config.port);
//!
//!     let renderer = AvTransportClient::with_config(endpoint, &config.soap_config());
//!     let session = PlaybackSession::new(tracks, endpoint, origin, config.poll_interval)?;
//!     let report = Orchestrator::new(&renderer, ThreadSleeper, session, &config).run()?;
//!     println!("played {} tracks", report.tracks_played);
//!     Ok(())
//! }
//! ```
//!
//! The media origin (download cache and HTTP server) lives in the
//! `media-origin` crate; the `gapless` binary wires everything together.

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod net;
pub mod orchestrator;
pub mod session;

pub use catalog::{Catalog, CatalogError, ManifestCatalog};
pub use config::PlayerConfig;
pub use error::PlayerError;
pub use orchestrator::{Orchestrator, PlaybackReport, PlaybackState, Sleeper, ThreadSleeper};
pub use session::PlaybackSession;
