//! UPnP AVTransport renderer discovery
//!
//! This crate finds media renderers on the local network with an SSDP
//! M-SEARCH for `urn:schemas-upnp-org:service:AVTransport:1`, reads each
//! responder's description document and resolves the absolute control URL
//! of its AVTransport service.
//!
//! # Quick Start
//!
//! ```no_run
//! use renderer_discovery::{discover, select};
//!
//! let renderers = discover()?;
//! for (i, renderer) in renderers.iter().enumerate() {
//!     println!("[{}] {} found at {}", i, renderer.friendly_name, renderer.base_url);
//! }
//! let control_endpoint = select(&renderers, 0)?;
//! # Ok::<(), renderer_discovery::DiscoveryError>(())
//! ```

mod discovery;
mod error;
mod selection;
mod ssdp;
pub mod description;

pub use discovery::{describe, describe_location, DiscoveryIterator};
pub use error::{DiscoveryError, Result};
pub use selection::{prompt_selection, select};

use std::time::Duration;

/// Service type searched for and matched in descriptions.
pub const AV_TRANSPORT_SERVICE: &str = "urn:schemas-upnp-org:service:AVTransport:1";

/// Default length of the SSDP search window.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// A renderer that answered the search.
///
/// Only lives until a control endpoint has been chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererDescriptor {
    /// `scheme://host:port` of the description location
    pub base_url: String,
    /// Human readable device name
    pub friendly_name: String,
    /// controlURL of the AVTransport service, as written in the description
    pub control_url: String,
}

impl RendererDescriptor {
    /// Absolute URL accepting AVTransport SOAP actions.
    pub fn control_endpoint(&self) -> String {
        description::join_control_url(&self.base_url, &self.control_url)
    }
}

/// Discover renderers with the default 3-second search window.
///
/// # Errors
///
/// `NoRendererFound` when nothing usable answered; socket setup failures are
/// reported as `NetworkError`. There is no retry.
pub fn discover() -> Result<Vec<RendererDescriptor>> {
    discover_with_timeout(DEFAULT_TIMEOUT)
}

/// Discover renderers with a custom search window.
pub fn discover_with_timeout(timeout: Duration) -> Result<Vec<RendererDescriptor>> {
    let renderers: Vec<_> = DiscoveryIterator::new(timeout)?.collect();
    if renderers.is_empty() {
        return Err(DiscoveryError::NoRendererFound);
    }
    Ok(renderers)
}
