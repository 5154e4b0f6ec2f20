use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

/// Message reported when a rejected request carries no readable `error` field
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown Error";

/// CloudPDF SDK error type
///
/// Every failure of the token issuer or the upload client is returned as one
/// of these variants. Nothing panics past the SDK boundary.
#[derive(Debug)]
pub enum CloudPdfError {
    /// Configuration is unusable (empty tenant, malformed access secret, bad base URL)
    Config(String),
    /// Caller input failed validation before any token was signed
    Validation(String),
    /// Token signing failed or the freshly signed token did not verify
    Token(String),
    /// Upload request failed (network, remote rejection, or response parsing)
    Api(ApiError),
}

impl CloudPdfError {
    /// Human-readable failure message
    ///
    /// For remote rejections this is exactly the message reported by the
    /// service (or [`UNKNOWN_ERROR_MESSAGE`]), without any prefix.
    pub fn message(&self) -> String {
        match self {
            CloudPdfError::Config(msg)
            | CloudPdfError::Validation(msg)
            | CloudPdfError::Token(msg) => msg.clone(),
            CloudPdfError::Api(ApiError::Rejected { message, .. }) => message.clone(),
            CloudPdfError::Api(err) => err.to_string(),
        }
    }

    /// True when the service accepted the upload but its reply could not be read
    ///
    /// The document may exist server-side even though the call failed locally.
    pub fn is_response_integrity(&self) -> bool {
        matches!(
            self,
            CloudPdfError::Api(ApiError::ResponseIntegrity { .. })
        )
    }
}

impl fmt::Display for CloudPdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudPdfError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CloudPdfError::Validation(msg) => write!(f, "Validation error: {}", msg),
            CloudPdfError::Token(msg) => write!(f, "Token error: {}", msg),
            CloudPdfError::Api(err) => write!(f, "API error: {}", err),
        }
    }
}

impl StdError for CloudPdfError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CloudPdfError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for CloudPdfError {
    fn from(err: ApiError) -> Self {
        CloudPdfError::Api(err)
    }
}

impl From<jsonwebtoken::errors::Error> for CloudPdfError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        CloudPdfError::Token(err.to_string())
    }
}

/// Upload-specific errors
#[derive(Debug)]
pub enum ApiError {
    /// Network error (connection, timeout, body transfer)
    Network {
        message: String,
        source: Option<reqwest::Error>,
    },
    /// Service answered with a non-success status
    Rejected { status: u16, message: String },
    /// Service answered with success but the body is not a document descriptor
    ResponseIntegrity { status: u16, body: String },
    /// Reading the caller's input failed
    Io(std::io::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network { message, .. } => write!(f, "Network error: {}", message),
            ApiError::Rejected { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            ApiError::ResponseIntegrity { status, body } => write!(
                f,
                "HTTP {} reported success but the response is not a document descriptor \
                 (the document may still have been stored): {}",
                status, body
            ),
            ApiError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ApiError::Network {
                source: Some(err), ..
            } => Some(err),
            ApiError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timeout".to_string()
        } else if err.is_connect() {
            format!("Connection failed: {}", err)
        } else {
            err.to_string()
        };
        ApiError::Network {
            message,
            source: Some(err),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Io(err)
    }
}

/// Document returned by the upload endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    pub id: String,
    pub name: String,
}

/// Error body returned by the upload endpoint on rejection
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UploadErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl UploadErrorBody {
    /// Best-effort message from a raw rejection body
    pub(crate) fn message_from(body: &str) -> String {
        serde_json::from_str::<UploadErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.error)
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message_is_verbatim() {
        let err = CloudPdfError::Api(ApiError::Rejected {
            status: 413,
            message: "quota exceeded".to_string(),
        });
        assert_eq!(err.message(), "quota exceeded");
        assert!(err.to_string().contains("HTTP 413"));
    }

    #[test]
    fn test_error_body_message_fallbacks() {
        assert_eq!(
            UploadErrorBody::message_from(r#"{"error":"quota exceeded"}"#),
            "quota exceeded"
        );
        assert_eq!(UploadErrorBody::message_from(""), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(UploadErrorBody::message_from("<html>"), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(UploadErrorBody::message_from(r#"{"status":"bad"}"#), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(UploadErrorBody::message_from("null"), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn test_response_integrity_is_distinct() {
        let integrity = CloudPdfError::Api(ApiError::ResponseIntegrity {
            status: 200,
            body: "{}".to_string(),
        });
        let network = CloudPdfError::Api(ApiError::Network {
            message: "Connection failed".to_string(),
            source: None,
        });
        assert!(integrity.is_response_integrity());
        assert!(!network.is_response_integrity());
    }

    #[test]
    fn test_io_error_is_exposed_as_source() {
        let err = CloudPdfError::from(ApiError::from(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "stream closed",
        )));
        let api = err.source().expect("api error source");
        assert!(api.source().is_some());
    }
}
