//! Device description parsing.
//!
//! UPnP descriptions list services as `<service>` blocks, but the pairing
//! used here is positional: every `serviceType` and every `controlURL` in the
//! document is collected in document order (nested devices included) and the
//! control URL at the index of the matching service type is taken. Devices
//! whose two lists differ in length are rejected instead of guessed at.

use quick_xml::events::Event;
use quick_xml::Reader;
use url::{Position, Url};

use crate::error::{DiscoveryError, Result};

/// The fields of a description document this crate cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionDocument {
    /// First `friendlyName` in the document (the root device's)
    pub friendly_name: String,
    /// Every `serviceType` value, in document order
    pub service_types: Vec<String>,
    /// Every `controlURL` value, in document order
    pub control_urls: Vec<String>,
}

#[derive(Clone, Copy)]
enum Field {
    FriendlyName,
    ServiceType,
    ControlUrl,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"friendlyName" => Some(Field::FriendlyName),
            b"serviceType" => Some(Field::ServiceType),
            b"controlURL" => Some(Field::ControlUrl),
            _ => None,
        }
    }
}

impl DescriptionDocument {
    /// Parse a description document.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::ParseError` if the XML is malformed or has no
    /// `friendlyName`.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut friendly_names = Vec::new();
        let mut service_types = Vec::new();
        let mut control_urls = Vec::new();

        let mut current: Option<Field> = None;
        let mut text = String::new();

        let mut push = |field: Field, value: String| match field {
            Field::FriendlyName => friendly_names.push(value),
            Field::ServiceType => service_types.push(value),
            Field::ControlUrl => control_urls.push(value),
        };

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    current = Field::from_local_name(e.local_name().as_ref());
                    text.clear();
                }
                Ok(Event::Empty(e)) => {
                    if let Some(field) = Field::from_local_name(e.local_name().as_ref()) {
                        push(field, String::new());
                    }
                }
                Ok(Event::Text(t)) => {
                    if current.is_some() {
                        let value = t.unescape().map_err(|e| {
                            DiscoveryError::ParseError(format!("Bad text in description: {}", e))
                        })?;
                        text.push_str(&value);
                    }
                }
                Ok(Event::CData(c)) => {
                    if current.is_some() {
                        text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                    }
                }
                Ok(Event::End(e)) => {
                    if let Some(field) = current.take() {
                        if Field::from_local_name(e.local_name().as_ref()).is_some() {
                            push(field, text.trim().to_string());
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(DiscoveryError::ParseError(format!(
                        "Failed to parse device XML at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
        }

        let friendly_name = friendly_names
            .into_iter()
            .next()
            .ok_or_else(|| DiscoveryError::ParseError("Missing friendlyName".to_string()))?;

        Ok(Self {
            friendly_name,
            service_types,
            control_urls,
        })
    }

    /// Control URL paired with `service_type` by position.
    ///
    /// # Errors
    ///
    /// `MismatchedServiceList` when the two lists cannot be aligned,
    /// `ServiceNotFound` when no `serviceType` equals `service_type`.
    pub fn control_url_for(&self, service_type: &str) -> Result<&str> {
        if self.service_types.len() != self.control_urls.len() {
            return Err(DiscoveryError::MismatchedServiceList {
                services: self.service_types.len(),
                control_urls: self.control_urls.len(),
            });
        }

        self.service_types
            .iter()
            .position(|s| s == service_type)
            .map(|index| self.control_urls[index].as_str())
            .ok_or_else(|| DiscoveryError::ServiceNotFound(service_type.to_string()))
    }
}

/// `scheme://host[:port]` of a device location URL.
pub fn base_url_of(location: &str) -> Result<String> {
    let url = Url::parse(location)
        .map_err(|e| DiscoveryError::ParseError(format!("Invalid location {}: {}", location, e)))?;
    if !url.has_host() {
        return Err(DiscoveryError::ParseError(format!(
            "Location {} has no host",
            location
        )));
    }
    Ok(url[..Position::AfterPort].to_string())
}

/// Join a base URL and a controlURL taken from a description.
///
/// Absolute control URLs are returned unchanged.
pub fn join_control_url(base_url: &str, control_url: &str) -> String {
    if control_url.starts_with("http://") || control_url.starts_with("https://") {
        control_url.to_string()
    } else if control_url.starts_with('/') {
        format!("{}{}", base_url, control_url)
    } else {
        format!("{}/{}", base_url, control_url)
    }
}
