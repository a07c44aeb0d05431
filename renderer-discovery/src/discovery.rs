//! Core discovery logic and iterator implementation.
//!
//! This module implements the discovery algorithm that:
//! 1. Sends an SSDP M-SEARCH for the AVTransport service
//! 2. Receives and deduplicates SSDP responses
//! 3. Fetches device descriptions via HTTP
//! 4. Pairs the AVTransport service type with its control URL
//! 5. Yields discovered renderers

use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use crate::description::{base_url_of, DescriptionDocument};
use crate::error::{DiscoveryError, Result};
use crate::ssdp::{SsdpClient, SsdpResponse};
use crate::{RendererDescriptor, AV_TRANSPORT_SERVICE};

/// Iterator that discovers AVTransport renderers on the local network.
///
/// The SSDP search runs on the first call to `next()`; descriptions are
/// fetched lazily, one per yielded renderer. Devices whose description
/// cannot be fetched or paired are skipped.
pub struct DiscoveryIterator {
    ssdp_client: Option<SsdpClient>,
    ssdp_buffer: Vec<SsdpResponse>,
    buffer_index: usize,
    seen_locations: HashSet<String>,
    http_client: reqwest::blocking::Client,
}

impl DiscoveryIterator {
    /// Create a new discovery iterator with the specified timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let ssdp_client = SsdpClient::new(timeout)?;
        let http_client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            ssdp_client: Some(ssdp_client),
            ssdp_buffer: Vec::new(),
            buffer_index: 0,
            seen_locations: HashSet::new(),
            http_client,
        })
    }

    fn is_av_transport(response: &SsdpResponse) -> bool {
        response.urn.contains("AVTransport") || response.usn.contains("AVTransport")
    }

    /// Fill the buffer with SSDP responses
    fn fill_buffer(&mut self) -> Result<()> {
        if let Some(client) = self.ssdp_client.take() {
            for result in client.search(AV_TRANSPORT_SERVICE)? {
                match result {
                    Ok(response) => self.ssdp_buffer.push(response),
                    Err(e) => warn!(error = %e, "SSDP receive failed"),
                }
            }
            debug!(responses = self.ssdp_buffer.len(), "SSDP search window closed");
        }
        Ok(())
    }

    fn resolve(&self, location: &str) -> Result<RendererDescriptor> {
        let xml = fetch_description(&self.http_client, location)?;
        describe(location, &xml)
    }
}

/// Fetch a description document over plain HTTP GET.
fn fetch_description(client: &reqwest::blocking::Client, location: &str) -> Result<String> {
    let response = client
        .get(location)
        .send()
        .map_err(|e| DiscoveryError::NetworkError(format!("Failed to fetch device description: {}", e)))?;

    if !response.status().is_success() {
        return Err(DiscoveryError::NetworkError(format!(
            "Description fetch returned HTTP {}",
            response.status()
        )));
    }

    response
        .text()
        .map_err(|e| DiscoveryError::NetworkError(format!("Failed to read response body: {}", e)))
}

/// Fetch and resolve a single known description location, bypassing SSDP.
///
/// Useful on networks where multicast does not reach the renderer.
pub fn describe_location(location: &str, timeout: Duration) -> Result<RendererDescriptor> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DiscoveryError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;
    let xml = fetch_description(&client, location)?;
    describe(location, &xml)
}

/// Build a renderer descriptor from a location and its description document.
pub fn describe(location: &str, xml: &str) -> Result<RendererDescriptor> {
    let document = DescriptionDocument::from_xml(xml)?;
    let control_url = document.control_url_for(AV_TRANSPORT_SERVICE)?.to_string();

    Ok(RendererDescriptor {
        base_url: base_url_of(location)?,
        friendly_name: document.friendly_name,
        control_url,
    })
}

impl Iterator for DiscoveryIterator {
    type Item = RendererDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ssdp_client.is_some() {
            if let Err(e) = self.fill_buffer() {
                warn!(error = %e, "SSDP search failed");
                return None;
            }
        }

        while self.buffer_index < self.ssdp_buffer.len() {
            let ssdp_response = self.ssdp_buffer[self.buffer_index].clone();
            self.buffer_index += 1;

            if !self.seen_locations.insert(ssdp_response.location.clone()) {
                continue;
            }

            if !Self::is_av_transport(&ssdp_response) {
                continue;
            }

            match self.resolve(&ssdp_response.location) {
                Ok(renderer) => return Some(renderer),
                Err(e) => {
                    warn!(location = %ssdp_response.location, error = %e, "skipping device");
                    continue;
                }
            }
        }
        None
    }
}
