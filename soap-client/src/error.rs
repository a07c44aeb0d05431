//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// The renderer answered with a non-success HTTP status
    #[error("HTTP {status} from control endpoint: {body}")]
    Http { status: u16, body: String },

    /// The request or the response body exceeded its deadline
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection-level failure (DNS, refused, reset, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// XML parsing error or missing response element
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// SOAP fault returned inside a successful HTTP response
    #[error("SOAP fault: error code {0}")]
    Fault(u16),
}
