use crate::cloudpdf_api::secret::{AccessSecret, SecretEncoding};
use crate::cloudpdf_api::types::CloudPdfError;
use std::time::Duration;

/// Production CloudPDF API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudpdf.io";

/// Default upload request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable configuration for the token issuer and upload client
///
/// Holds the tenant ("cloud name") that every token is scoped to, the shared
/// access secret, and the transport settings for uploads.
#[derive(Debug, Clone)]
pub struct CloudPdfConfig {
    /// Tenant identity, embedded as `kid` in every token
    pub cloud_name: String,
    /// Shared HMAC secret and its encoding
    pub access_secret: AccessSecret,
    /// Base URL of the CloudPDF API
    pub api_base_url: String,
    /// Timeout for a single upload request
    pub timeout: Duration,
    /// Retry once when the connection could not be established
    pub retry_on_connect_failure: bool,
}

impl CloudPdfConfig {
    /// Create a configuration with default transport settings
    pub fn new(cloud_name: impl Into<String>, access_secret: AccessSecret) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            access_secret,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_on_connect_failure: true,
        }
    }

    /// Set the secret encoding (builder pattern)
    pub fn with_secret_encoding(mut self, encoding: SecretEncoding) -> Self {
        self.access_secret = self.access_secret.with_encoding(encoding);
        self
    }

    /// Set the API base URL (builder pattern)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the upload timeout (builder pattern)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable the single connect-failure retry (builder pattern)
    pub fn with_retry_on_connect_failure(mut self, retry: bool) -> Self {
        self.retry_on_connect_failure = retry;
        self
    }

    /// Check the configuration before any token is signed or request sent
    ///
    /// Decodes the access secret so a malformed secret is reported here
    /// rather than on first use.
    pub fn validate(&self) -> Result<(), CloudPdfError> {
        if self.cloud_name.trim().is_empty() {
            return Err(CloudPdfError::Config(
                "Cloud name must not be empty".to_string(),
            ));
        }

        self.access_secret.key_bytes()?;

        let url = url::Url::parse(&self.api_base_url).map_err(|e| {
            CloudPdfError::Config(format!(
                "Invalid API base URL '{}': {}",
                self.api_base_url, e
            ))
        })?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(CloudPdfError::Config(format!(
                "API base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.timeout.is_zero() {
            return Err(CloudPdfError::Config(
                "Timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Upload endpoint derived from the base URL
    pub fn upload_url(&self) -> String {
        format!("{}/api/upload", self.api_base_url.trim_end_matches('/'))
    }
}
