//! Private SOAP client for UPnP device communication
//!
//! This crate provides a minimal SOAP 1.1 client for sending control actions
//! to UPnP media renderers. Envelopes are built as XML trees (see
//! [`envelope`]) and posted to the renderer's absolute control URL.

mod error;
pub mod envelope;

pub use envelope::{build_envelope, render, text_element, to_xml_string};
pub use error::SoapError;

use std::time::Duration;
use tracing::debug;
use xmltree::Element;

/// Timeouts applied to every control call.
#[derive(Debug, Clone)]
pub struct SoapConfig {
    /// Deadline for establishing the TCP connection
    /// Default: 5 seconds
    pub connect_timeout: Duration,

    /// Deadline for the whole request, body included
    /// Default: 10 seconds
    pub request_timeout: Duration,
}

impl Default for SoapConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// A minimal SOAP client for UPnP device communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
}

impl SoapClient {
    /// Create a new SOAP client with default configuration
    pub fn new() -> Self {
        Self::with_config(&SoapConfig::default())
    }

    /// Create a SOAP client with explicit timeouts
    pub fn with_config(config: &SoapConfig) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(config.connect_timeout)
                .timeout(config.request_timeout)
                .build(),
        }
    }

    /// Send a SOAP request and return the parsed `<{action}Response>` element
    ///
    /// # Arguments
    /// * `control_url` - Absolute control URL of the service
    /// * `service_uri` - Service type URN, used for the `u:` namespace and `SOAPAction`
    /// * `action` - Action name, e.g. `SetAVTransportURI`
    /// * `args` - Action arguments in wire order
    pub fn call(
        &self,
        control_url: &str,
        service_uri: &str,
        action: &str,
        args: Vec<Element>,
    ) -> Result<Element, SoapError> {
        let body = render(&build_envelope(service_uri, action, args))?;
        let soap_action = format!("\"{}#{}\"", service_uri, action);

        debug!(%control_url, %action, "sending SOAP request");

        let response = self
            .agent
            .post(control_url)
            .set("Content-Type", "text/xml; charset=utf-8")
            .set("SOAPAction", &soap_action)
            .send_string(&body)
            .map_err(classify)?;

        let xml_text = response.into_string().map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                SoapError::Timeout(e.to_string())
            } else {
                SoapError::Network(e.to_string())
            }
        })?;

        let xml = Element::parse(xml_text.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        self.extract_response(&xml, action)
    }

    fn extract_response(&self, xml: &Element, action: &str) -> Result<Element, SoapError> {
        let body = xml
            .get_child("Body")
            .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

        // Check for SOAP fault first
        if let Some(fault) = body.get_child("Fault") {
            let error_code = fault
                .get_child("detail")
                .and_then(|d| d.get_child("UPnPError"))
                .and_then(|e| e.get_child("errorCode"))
                .and_then(|c| c.get_text())
                .and_then(|t| t.trim().parse::<u16>().ok())
                .unwrap_or(500);
            return Err(SoapError::Fault(error_code));
        }

        let response_name = format!("{}Response", action);
        body.get_child(response_name.as_str())
            .cloned()
            .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a ureq failure onto the SOAP error taxonomy.
fn classify(error: ureq::Error) -> SoapError {
    match error {
        ureq::Error::Status(status, response) => {
            // The body is diagnostic only; an unreadable one is reported empty.
            let body = response.into_string().unwrap_or_default();
            SoapError::Http { status, body }
        }
        ureq::Error::Transport(transport) => {
            if is_timeout(&transport) {
                SoapError::Timeout(transport.to_string())
            } else {
                SoapError::Network(transport.to_string())
            }
        }
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    use std::error::Error as _;

    let mut source = transport.source();
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ) {
                return true;
            }
        }
        source = err.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soap_client_creation() {
        let _client = SoapClient::new();
        let _default_client = SoapClient::default();
        let _configured = SoapClient::with_config(&SoapConfig {
            connect_timeout: Duration::from_millis(200),
            request_timeout: Duration::from_secs(1),
        });
    }

    #[test]
    fn test_extract_response_with_valid_response() {
        let client = SoapClient::new();

        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <u:PlayResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1">
                    </u:PlayResponse>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        let response = client.extract_response(&xml, "Play").unwrap();
        assert_eq!(response.name, "PlayResponse");
    }

    #[test]
    fn test_extract_response_with_soap_fault() {
        let client = SoapClient::new();

        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <s:Fault>
                        <faultcode>s:Client</faultcode>
                        <faultstring>UPnPError</faultstring>
                        <detail>
                            <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
                                <errorCode>714</errorCode>
                                <errorDescription>Illegal MIME-type</errorDescription>
                            </UPnPError>
                        </detail>
                    </s:Fault>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match client.extract_response(&xml, "SetAVTransportURI").unwrap_err() {
            SoapError::Fault(code) => assert_eq!(code, 714),
            other => panic!("Expected SoapError::Fault, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_response_missing_body() {
        let client = SoapClient::new();

        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match client.extract_response(&xml, "Play").unwrap_err() {
            SoapError::Parse(msg) => assert!(msg.contains("Missing SOAP Body")),
            other => panic!("Expected SoapError::Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_response_missing_action_response() {
        let client = SoapClient::new();

        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match client.extract_response(&xml, "GetPositionInfo").unwrap_err() {
            SoapError::Parse(msg) => assert!(msg.contains("Missing GetPositionInfoResponse element")),
            other => panic!("Expected SoapError::Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_soap_fault_with_default_error_code() {
        let client = SoapClient::new();

        let xml_str = r#"
            <s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
                <s:Body>
                    <s:Fault>
                        <faultcode>s:Server</faultcode>
                        <faultstring>Internal Error</faultstring>
                    </s:Fault>
                </s:Body>
            </s:Envelope>
        "#;

        let xml = Element::parse(xml_str.as_bytes()).unwrap();
        match client.extract_response(&xml, "Play").unwrap_err() {
            SoapError::Fault(code) => assert_eq!(code, 500),
            other => panic!("Expected SoapError::Fault, got {:?}", other),
        }
    }
}
