/// CloudPDF API integration module
///
/// This module provides the token issuer and the upload client for the
/// CloudPDF document service.
///
/// ## Upload Flow
///
/// 1. Caller builds a `CloudPdfConfig` with its cloud name and access secret
/// 2. `TokenIssuer` signs an HS256 upload token (`kid` = cloud name) with the requested expiry
/// 3. `CloudPdfClient` posts the file as multipart form data with the token in `v-authorization`
/// 4. CloudPDF answers with the stored document's id and name, or an error message
pub mod client;
pub mod config;
pub mod jwt;
pub mod secret;
pub mod types;

pub use client::CloudPdfClient;
pub use config::CloudPdfConfig;
pub use jwt::{decode_token_unverified, ClaimSet, ClaimValue, TokenClaims, TokenIssuer};
pub use secret::{AccessSecret, SecretEncoding};
pub use types::{ApiError, CloudPdfError, DocumentDescriptor};
