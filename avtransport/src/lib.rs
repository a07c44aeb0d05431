//! Typed UPnP AVTransport control for gapless album playback
//!
//! This crate turns playback intents (set the current item, queue the next
//! one, play, poll the position) into SOAP calls through the private
//! `soap-client` crate, and encodes the DIDL-Lite metadata renderers need to
//! display what they are playing.
//!
//! ```rust,no_run
//! use avtransport::{AvTransportClient, MediaOrigin, RendererControl};
//! use std::net::{IpAddr, Ipv4Addr};
//!
//! let client = AvTransportClient::new("http://192.168.1.40:49152/upnp/control/rendertransport1");
//! let position = client.position_info()?;
//! println!("elapsed: {}s", position.elapsed_seconds()?);
//! # let _origin = MediaOrigin::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000);
//! # Ok::<(), avtransport::ApiError>(())
//! ```

pub mod action;
pub mod client;
pub mod control;
pub mod didl;
pub mod error;
pub mod time;
pub mod track;

pub use action::{ActionReply, PositionInfo, TransportAction, TransportInfo, SERVICE_URI};
pub use client::AvTransportClient;
pub use control::RendererControl;
pub use didl::encode_metadata;
pub use error::{ApiError, Result};
pub use time::{format_duration, format_hms, parse_hms, TimeParseError};
pub use track::{track_path, MediaOrigin, PlayableTrack};
