//! CloudPDF SDK
//!
//! A Rust library for integrating with the CloudPDF document service.
//!
//! This SDK provides:
//! - HS256 access tokens for uploading, viewing, downloading and searching documents
//! - Access secrets provisioned either as raw UTF-8 or as URL-safe base64
//! - A document upload client that maps every outcome to a typed error
//!
//! # Example
//!
//! ```no_run
//! use cloudpdf_sdk::{AccessSecret, CloudPdfClient, CloudPdfConfig};
//! use chrono::{Duration, Utc};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CloudPdfConfig::new("my-cloud", AccessSecret::base64_url("c2VjcmV0LWtleQ"));
//! let client = CloudPdfClient::new(config)?;
//!
//! // Upload a document
//! let file = tokio::fs::File::open("report.pdf").await?;
//! let document = client
//!     .upload_document_from_reader(file, "report.pdf", Utc::now() + Duration::minutes(5), true, true)
//!     .await?;
//!
//! // Give a viewer read-only access for an hour
//! let token = client.viewing_token(&document.id, false, true, Utc::now() + Duration::hours(1))?;
//! println!("Viewer token: {}", token);
//! # Ok(())
//! # }
//! ```

pub mod cloudpdf_api;

// Re-export commonly used types and functions
pub use cloudpdf_api::{
    client::{CloudPdfClient, AUTHORIZATION_HEADER},
    config::{CloudPdfConfig, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT},
    jwt::{
        decode_token_unverified, upload_claims, view_claims, ClaimSet, ClaimValue, DecodedToken,
        TokenClaims, TokenIssuer, TOKEN_ALGORITHM,
    },
    secret::{AccessSecret, SecretEncoding},
    types::{ApiError, CloudPdfError, DocumentDescriptor, UNKNOWN_ERROR_MESSAGE},
};
