use avtransport::ApiError;
use media_origin::MediaError;
use renderer_discovery::DiscoveryError;
use thiserror::Error;

use crate::catalog::CatalogError;

/// Everything that can end a playback run.
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("No AVTransport renderer found on the network")]
    NoRendererFound,

    #[error("Invalid renderer selection: {0}")]
    InvalidSelection(String),

    #[error("Cancelled by user")]
    UserCancelled,

    /// A control call failed at the HTTP or connection level
    #[error("Transport error: {0}")]
    Transport(ApiError),

    /// A renderer reply could not be understood
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The renderer cannot be reached or its address cannot be resolved
    #[error("Connectivity error: {0}")]
    ConnectivityError(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Media error: {0}")]
    Media(MediaError),

    #[error("Track {track} not ready after {waited_secs}s")]
    TrackNotReady { track: String, waited_secs: u64 },

    /// Too many polling ticks in a row failed
    #[error("Renderer unresponsive after {failures} consecutive failures (last: {last_error})")]
    RendererUnresponsive { failures: u32, last_error: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ApiError> for PlayerError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::MalformedResponse(msg) => PlayerError::MalformedResponse(msg),
            other => PlayerError::Transport(other),
        }
    }
}

impl From<DiscoveryError> for PlayerError {
    fn from(error: DiscoveryError) -> Self {
        match error {
            DiscoveryError::NoRendererFound => PlayerError::NoRendererFound,
            DiscoveryError::UserCancelled => PlayerError::UserCancelled,
            e @ (DiscoveryError::InvalidSelection { .. }
            | DiscoveryError::UnrecognizedSelection { .. }) => PlayerError::InvalidSelection(e.to_string()),
            DiscoveryError::NetworkError(msg) => PlayerError::ConnectivityError(msg),
            e @ (DiscoveryError::ParseError(_)
            | DiscoveryError::ServiceNotFound(_)
            | DiscoveryError::MismatchedServiceList { .. }) => {
                PlayerError::MalformedResponse(e.to_string())
            }
        }
    }
}

impl From<MediaError> for PlayerError {
    fn from(error: MediaError) -> Self {
        match error {
            MediaError::NotReady { path, waited_secs } => PlayerError::TrackNotReady {
                track: path,
                waited_secs,
            },
            MediaError::Unavailable { path } => PlayerError::TrackNotReady {
                track: path,
                waited_secs: 0,
            },
            other => PlayerError::Media(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_split() {
        let err: PlayerError = ApiError::MalformedResponse("missing AbsTime".to_string()).into();
        assert!(matches!(err, PlayerError::MalformedResponse(_)));

        let err: PlayerError = ApiError::Timeout("read".to_string()).into();
        assert!(matches!(err, PlayerError::Transport(ApiError::Timeout(_))));
    }

    #[test]
    fn test_discovery_error_mapping() {
        let err: PlayerError = DiscoveryError::InvalidSelection { index: 5, available: 2 }.into();
        match err {
            PlayerError::InvalidSelection(msg) => assert!(msg.contains("expected 0-1")),
            other => panic!("Expected InvalidSelection, got {:?}", other),
        }

        let err: PlayerError = DiscoveryError::UserCancelled.into();
        assert!(matches!(err, PlayerError::UserCancelled));

        let err: PlayerError = DiscoveryError::NoRendererFound.into();
        assert!(matches!(err, PlayerError::NoRendererFound));
    }

    #[test]
    fn test_not_ready_maps_to_track_not_ready() {
        let err: PlayerError = MediaError::NotReady {
            path: "1/2.flac".to_string(),
            waited_secs: 120,
        }
        .into();
        assert_eq!(err.to_string(), "Track 1/2.flac not ready after 120s");
    }
}
