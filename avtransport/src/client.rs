use soap_client::{SoapClient, SoapConfig};
use tracing::{debug, warn};

use crate::action::{ActionReply, TransportAction, SERVICE_URI};
use crate::error::{ApiError, Result};

/// A client bound to one renderer's AVTransport control endpoint
///
/// Each call is an independent HTTP exchange; the client keeps no playback
/// state of its own.
#[derive(Debug, Clone)]
pub struct AvTransportClient {
    soap: SoapClient,
    control_url: String,
}

impl AvTransportClient {
    /// Create a client for the absolute `control_url` with default timeouts
    pub fn new(control_url: impl Into<String>) -> Self {
        Self::with_soap_client(SoapClient::new(), control_url)
    }

    /// Create a client with explicit SOAP timeouts
    pub fn with_config(control_url: impl Into<String>, config: &SoapConfig) -> Self {
        Self::with_soap_client(SoapClient::with_config(config), control_url)
    }

    pub fn with_soap_client(soap: SoapClient, control_url: impl Into<String>) -> Self {
        Self {
            soap,
            control_url: control_url.into(),
        }
    }

    pub fn control_url(&self) -> &str {
        &self.control_url
    }

    /// Send one action and interpret its reply.
    ///
    /// # Returns
    /// `ActionReply::Done` for commands, the parsed info struct for queries
    pub fn invoke(&self, action: TransportAction<'_>) -> Result<ActionReply> {
        let args = action.arguments()?;
        let name = action.soap_action();
        debug!(action = name, control_url = %self.control_url, "invoking AVTransport action");

        let response = self
            .soap
            .call(&self.control_url, SERVICE_URI, name, args)
            .map_err(|e| {
                let error = ApiError::from(e);
                warn!(action = name, %error, "AVTransport action failed");
                error
            })?;

        action.parse_reply(&response)
    }

    /// Send a command whose reply carries nothing of interest.
    pub(crate) fn command(&self, action: TransportAction<'_>) -> Result<()> {
        match self.invoke(action)? {
            ActionReply::Done => Ok(()),
            other => Err(ApiError::MalformedResponse(format!(
                "unexpected reply to {}: {:?}",
                action.soap_action(),
                other
            ))),
        }
    }
}
