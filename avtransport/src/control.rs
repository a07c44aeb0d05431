//! The renderer control seam used by the playback loop.

use crate::action::{ActionReply, PositionInfo, TransportAction, TransportInfo};
use crate::client::AvTransportClient;
use crate::error::{ApiError, Result};
use crate::track::{MediaOrigin, PlayableTrack};

/// Everything the player needs from a renderer.
///
/// Implemented by [`AvTransportClient`]; tests substitute a scripted renderer.
pub trait RendererControl {
    fn set_current_uri(&self, track: &PlayableTrack, origin: &MediaOrigin) -> Result<()>;
    fn set_next_uri(&self, track: &PlayableTrack, origin: &MediaOrigin) -> Result<()>;
    fn set_play_mode_normal(&self) -> Result<()>;
    fn play(&self) -> Result<()>;
    fn pause(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;
    fn seek(&self, target_seconds: u32) -> Result<()>;
    fn position_info(&self) -> Result<PositionInfo>;
    fn transport_info(&self) -> Result<TransportInfo>;
}

impl RendererControl for AvTransportClient {
    fn set_current_uri(&self, track: &PlayableTrack, origin: &MediaOrigin) -> Result<()> {
        self.command(TransportAction::SetCurrentUri { track, origin })
    }

    fn set_next_uri(&self, track: &PlayableTrack, origin: &MediaOrigin) -> Result<()> {
        self.command(TransportAction::SetNextUri { track, origin })
    }

    fn set_play_mode_normal(&self) -> Result<()> {
        self.command(TransportAction::SetPlayMode)
    }

    fn play(&self) -> Result<()> {
        self.command(TransportAction::Play)
    }

    fn pause(&self) -> Result<()> {
        self.command(TransportAction::Pause)
    }

    fn stop(&self) -> Result<()> {
        self.command(TransportAction::Stop)
    }

    fn seek(&self, target_seconds: u32) -> Result<()> {
        self.command(TransportAction::Seek { target_seconds })
    }

    fn position_info(&self) -> Result<PositionInfo> {
        match self.invoke(TransportAction::GetPositionInfo)? {
            ActionReply::Position(info) => Ok(info),
            other => Err(unexpected("GetPositionInfo", &other)),
        }
    }

    fn transport_info(&self) -> Result<TransportInfo> {
        match self.invoke(TransportAction::GetTransportInfo)? {
            ActionReply::Transport(info) => Ok(info),
            other => Err(unexpected("GetTransportInfo", &other)),
        }
    }
}

fn unexpected(action: &str, reply: &ActionReply) -> ApiError {
    ApiError::MalformedResponse(format!("unexpected reply to {}: {:?}", action, reply))
}
