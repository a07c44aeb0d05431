use soap_client::SoapError;
use thiserror::Error;

use crate::time::TimeParseError;

/// Errors surfaced by AVTransport actions
///
/// Every action is a single independent HTTP exchange, so each variant
/// describes the outcome of exactly one call; nothing here implies the
/// renderer is gone for good.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The control endpoint answered with a non-success HTTP status
    #[error("Transport error: HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    /// The call exceeded its deadline
    #[error("Transport error: timed out: {0}")]
    Timeout(String),

    /// Connection-level failure before any HTTP status was received
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The reply was not XML, or an expected field was absent or unreadable
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// SOAP fault carried inside a successful response
    #[error("SOAP fault: error code {0}")]
    SoapFault(u16),
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<SoapError> for ApiError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Http { status, body } => ApiError::Transport { status, body },
            SoapError::Timeout(msg) => ApiError::Timeout(msg),
            SoapError::Network(msg) => ApiError::NetworkError(msg),
            SoapError::Parse(msg) => ApiError::MalformedResponse(msg),
            SoapError::Fault(code) => ApiError::SoapFault(code),
        }
    }
}

impl From<TimeParseError> for ApiError {
    fn from(error: TimeParseError) -> Self {
        ApiError::MalformedResponse(error.to_string())
    }
}
