//! Error types for the discovery system.

use std::fmt;

/// Error type for discovery operations.
///
/// Network and parse failures on individual devices are absorbed by the
/// discovery iterator; the variants below that reach the caller are the
/// ones that end a run.
#[derive(Debug)]
pub enum DiscoveryError {
    /// Network-related errors (socket creation, HTTP requests, etc.)
    NetworkError(String),
    /// Parsing errors (XML, SSDP response, location URL, etc.)
    ParseError(String),
    /// The search window closed without a usable renderer
    NoRendererFound,
    /// Operator picked an index outside the presented list
    InvalidSelection { index: usize, available: usize },
    /// Operator typed something that is not a list index
    UnrecognizedSelection { input: String, available: usize },
    /// Operator declined to pick a renderer
    UserCancelled,
    /// The description document does not list the requested service
    ServiceNotFound(String),
    /// serviceType and controlURL lists differ in length, so positions cannot be paired
    MismatchedServiceList { services: usize, control_urls: usize },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DiscoveryError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DiscoveryError::NoRendererFound => write!(f, "No AVTransport renderer found"),
            DiscoveryError::InvalidSelection { index, available } => {
                write!(f, "Invalid selection {}: ", index)?;
                write_choices(f, *available)
            }
            DiscoveryError::UnrecognizedSelection { input, available } => {
                write!(f, "Invalid selection {:?}: ", input)?;
                write_choices(f, *available)
            }
            DiscoveryError::UserCancelled => write!(f, "Renderer selection cancelled"),
            DiscoveryError::ServiceNotFound(service) => {
                write!(f, "Service {} not listed in device description", service)
            }
            DiscoveryError::MismatchedServiceList { services, control_urls } => write!(
                f,
                "Device lists {} serviceType elements but {} controlURL elements",
                services, control_urls
            ),
        }
    }
}

fn write_choices(f: &mut fmt::Formatter<'_>, available: usize) -> fmt::Result {
    if available == 0 {
        write!(f, "no renderers available")
    } else {
        write!(f, "expected 0-{}", available - 1)
    }
}

impl std::error::Error for DiscoveryError {}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
