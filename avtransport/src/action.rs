//! The AVTransport action set and its replies.
//!
//! Every action targets `InstanceID` 0. Arguments are produced in the order
//! the AVTransport:1 service description lists them.

use soap_client::text_element;
use xmltree::Element;

use crate::didl::metadata_element;
use crate::error::{ApiError, Result};
use crate::time::{format_hms, parse_hms};
use crate::track::{MediaOrigin, PlayableTrack};

/// Service type URN of AVTransport:1.
pub const SERVICE_URI: &str = "urn:schemas-upnp-org:service:AVTransport:1";

const INSTANCE_ID: &str = "0";

/// One AVTransport call.
///
/// Stateless and cheap: build one per call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportAction<'a> {
    /// `SetAVTransportURI`: replace the current item
    SetCurrentUri {
        track: &'a PlayableTrack,
        origin: &'a MediaOrigin,
    },
    /// `SetNextAVTransportURI`: queue the item to follow the current one
    SetNextUri {
        track: &'a PlayableTrack,
        origin: &'a MediaOrigin,
    },
    /// `SetPlayMode` with `NORMAL`
    SetPlayMode,
    /// `Play` at speed 1
    Play,
    Pause,
    /// `Seek` to a position in the current track, `REL_TIME` unit
    Seek { target_seconds: u32 },
    Stop,
    GetPositionInfo,
    GetTransportInfo,
}

impl<'a> TransportAction<'a> {
    /// SOAP action name, the part after `#` in the `SOAPAction` header.
    pub fn soap_action(&self) -> &'static str {
        match self {
            TransportAction::SetCurrentUri { .. } => "SetAVTransportURI",
            TransportAction::SetNextUri { .. } => "SetNextAVTransportURI",
            TransportAction::SetPlayMode => "SetPlayMode",
            TransportAction::Play => "Play",
            TransportAction::Pause => "Pause",
            TransportAction::Seek { .. } => "Seek",
            TransportAction::Stop => "Stop",
            TransportAction::GetPositionInfo => "GetPositionInfo",
            TransportAction::GetTransportInfo => "GetTransportInfo",
        }
    }

    /// Full `SOAPAction` header value, unquoted.
    pub fn soap_action_header(&self) -> String {
        format!("{}#{}", SERVICE_URI, self.soap_action())
    }

    /// Whether the reply carries data that has to be parsed.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            TransportAction::GetPositionInfo | TransportAction::GetTransportInfo
        )
    }

    /// Argument elements, `InstanceID` first.
    pub fn arguments(&self) -> Result<Vec<Element>> {
        let mut args = vec![text_element("InstanceID", INSTANCE_ID)];
        match *self {
            TransportAction::SetCurrentUri { track, origin } => {
                args.push(text_element("CurrentURI", origin.track_url(track)));
                args.push(metadata_element("CurrentURIMetaData", track, origin)?);
            }
            TransportAction::SetNextUri { track, origin } => {
                args.push(text_element("NextURI", origin.track_url(track)));
                args.push(metadata_element("NextURIMetaData", track, origin)?);
            }
            TransportAction::SetPlayMode => {
                args.push(text_element("NewPlayMode", "NORMAL"));
            }
            TransportAction::Play => {
                args.push(text_element("Speed", "1"));
            }
            TransportAction::Seek { target_seconds } => {
                args.push(text_element("Unit", "REL_TIME"));
                args.push(text_element("Target", format_hms(target_seconds)));
            }
            TransportAction::Pause
            | TransportAction::Stop
            | TransportAction::GetPositionInfo
            | TransportAction::GetTransportInfo => {}
        }
        Ok(args)
    }

    /// Interpret the `<{Action}Response>` element.
    pub fn parse_reply(&self, response: &Element) -> Result<ActionReply> {
        match self {
            TransportAction::GetPositionInfo => {
                PositionInfo::from_response(response).map(ActionReply::Position)
            }
            TransportAction::GetTransportInfo => {
                TransportInfo::from_response(response).map(ActionReply::Transport)
            }
            _ => Ok(ActionReply::Done),
        }
    }
}

/// Outcome of a successful action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionReply {
    /// Command accepted; nothing to read back
    Done,
    Position(PositionInfo),
    Transport(TransportInfo),
}

/// `GetPositionInfo` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionInfo {
    pub track: u32,
    pub track_duration: String,
    pub track_uri: String,
    pub rel_time: String,
    pub abs_time: String,
}

impl PositionInfo {
    /// `AbsTime` is required; the other fields default to empty/zero when a
    /// renderer omits them.
    pub fn from_response(xml: &Element) -> Result<Self> {
        Ok(Self {
            track: optional_text(xml, "Track")
                .and_then(|t| t.parse().ok())
                .unwrap_or(0),
            track_duration: optional_text(xml, "TrackDuration").unwrap_or_default(),
            track_uri: optional_text(xml, "TrackURI").unwrap_or_default(),
            rel_time: optional_text(xml, "RelTime").unwrap_or_default(),
            abs_time: required_text(xml, "AbsTime")?,
        })
    }

    /// Elapsed playback time in whole seconds, from `AbsTime`.
    pub fn elapsed_seconds(&self) -> Result<u32> {
        Ok(parse_hms(&self.abs_time)?)
    }
}

/// `GetTransportInfo` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportInfo {
    pub current_transport_state: String,
    pub current_transport_status: String,
    pub current_speed: String,
}

impl TransportInfo {
    pub fn from_response(xml: &Element) -> Result<Self> {
        Ok(Self {
            current_transport_state: required_text(xml, "CurrentTransportState")?,
            current_transport_status: optional_text(xml, "CurrentTransportStatus")
                .unwrap_or_default(),
            current_speed: optional_text(xml, "CurrentSpeed").unwrap_or_default(),
        })
    }

    pub fn is_playing(&self) -> bool {
        self.current_transport_state == "PLAYING"
    }
}

fn optional_text(xml: &Element, name: &str) -> Option<String> {
    xml.get_child(name)
        .and_then(|e| e.get_text())
        .map(|t| t.trim().to_string())
}

fn required_text(xml: &Element, name: &str) -> Result<String> {
    optional_text(xml, name)
        .ok_or_else(|| ApiError::MalformedResponse(format!("missing {} in response", name)))
}
