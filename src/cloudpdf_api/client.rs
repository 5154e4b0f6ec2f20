use crate::cloudpdf_api::config::CloudPdfConfig;
use crate::cloudpdf_api::jwt::TokenIssuer;
use crate::cloudpdf_api::types::{ApiError, CloudPdfError, DocumentDescriptor, UploadErrorBody};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Header carrying the signed token on upload requests
pub const AUTHORIZATION_HEADER: &str = "v-authorization";

/// Multipart field holding the uploaded file
const FILE_FIELD: &str = "file";

/// HTTP client for the CloudPDF API
///
/// Issues its own upload tokens from the configured tenant and secret and
/// posts documents to the upload endpoint. Cheap to clone; every call is
/// independent.
#[derive(Debug, Clone)]
pub struct CloudPdfClient {
    /// Full upload endpoint URL
    upload_url: String,
    /// Token issuer scoped to the configured cloud
    issuer: TokenIssuer,
    /// HTTP client for making requests
    client: reqwest::Client,
    /// Retry once when the connection could not be established
    retry_on_connect_failure: bool,
}

impl CloudPdfClient {
    /// Create a new CloudPDF API client
    ///
    /// Validates the configuration, so a malformed secret or base URL is
    /// reported here before any network attempt.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cloudpdf_sdk::{AccessSecret, CloudPdfClient, CloudPdfConfig};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = CloudPdfConfig::new("my-cloud", AccessSecret::utf8("my-secret"));
    /// let client = CloudPdfClient::new(config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: CloudPdfConfig) -> Result<Self, CloudPdfError> {
        config.validate()?;

        let issuer = TokenIssuer::from_config(&config)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CloudPdfError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let upload_url = config.upload_url();
        tracing::debug!("Creating CloudPdfClient with upload URL: {}", upload_url);

        Ok(Self {
            upload_url,
            issuer,
            client,
            retry_on_connect_failure: config.retry_on_connect_failure,
        })
    }

    /// Token issuer used by this client
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Get the upload endpoint URL for this client
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// Token granting a viewer access to one document
    pub fn viewing_token(
        &self,
        document_id: &str,
        allow_download: bool,
        allow_search: bool,
        expiry: DateTime<Utc>,
    ) -> Result<String, CloudPdfError> {
        self.issuer
            .issue_view_token(document_id, allow_download, allow_search, expiry)
    }

    /// Upload a document
    ///
    /// Signs an upload token valid until `expiry`, posts the file as the
    /// `file` part of a multipart form and returns the stored document.
    ///
    /// # Errors
    ///
    /// * [`CloudPdfError::Validation`] if `file_name` is empty
    /// * [`ApiError::Network`] if the request could not be completed
    /// * [`ApiError::Rejected`] with the service's `error` message, or
    ///   `"Unknown Error"` when the body has none
    /// * [`ApiError::ResponseIntegrity`] if the service reported success but
    ///   the body is not a document descriptor; the document may exist
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cloudpdf_sdk::{AccessSecret, CloudPdfClient, CloudPdfConfig};
    /// use chrono::{Duration, Utc};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = CloudPdfClient::new(CloudPdfConfig::new("my-cloud", AccessSecret::utf8("my-secret")))?;
    /// let bytes = tokio::fs::read("report.pdf").await?;
    /// let document = client
    ///     .upload_document(bytes, "report.pdf", Utc::now() + Duration::minutes(5), true, true)
    ///     .await?;
    /// println!("Uploaded {} as {}", document.name, document.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upload_document(
        &self,
        file: impl Into<Bytes>,
        file_name: impl Into<String>,
        expiry: DateTime<Utc>,
        public: bool,
        search: bool,
    ) -> Result<DocumentDescriptor, CloudPdfError> {
        let file: Bytes = file.into();
        let file_name = file_name.into();

        if file_name.trim().is_empty() {
            return Err(CloudPdfError::Validation(
                "File name must not be empty".to_string(),
            ));
        }

        tracing::info!(
            "Uploading document to CloudPDF: file_name={}, size={} bytes, public={}, search={}",
            file_name,
            file.len(),
            public,
            search
        );

        let token = self.issuer.issue_upload_token(public, search, expiry)?;
        let response = self.send_upload(&token, file, &file_name).await?;

        let status = response.status();
        tracing::debug!("Received upload response with status: {}", status);

        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read upload response body: {}", e);
            ApiError::from(e)
        })?;

        if !status.is_success() {
            let message = UploadErrorBody::message_from(&body);
            tracing::error!("Upload rejected: HTTP {} - {}", status.as_u16(), message);
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let document = match serde_json::from_str::<DocumentDescriptor>(&body) {
            Ok(document) if !document.id.is_empty() => document,
            Ok(_) => {
                tracing::error!("Upload response has an empty document id: {}", body);
                return Err(ApiError::ResponseIntegrity {
                    status: status.as_u16(),
                    body,
                }
                .into());
            }
            Err(e) => {
                tracing::error!(
                    "Failed to parse upload response: {} - Response body: {}",
                    e,
                    body
                );
                return Err(ApiError::ResponseIntegrity {
                    status: status.as_u16(),
                    body,
                }
                .into());
            }
        };

        tracing::info!(
            "Document uploaded successfully: id={}, name={}",
            document.id,
            document.name
        );

        Ok(document)
    }

    /// Upload a document read to completion from `reader`
    ///
    /// The upload endpoint needs the whole multipart body up front, so the
    /// reader is buffered in memory before the token is issued.
    pub async fn upload_document_from_reader<R>(
        &self,
        mut reader: R,
        file_name: impl Into<String>,
        expiry: DateTime<Utc>,
        public: bool,
        search: bool,
    ) -> Result<DocumentDescriptor, CloudPdfError>
    where
        R: AsyncRead + Unpin,
    {
        let mut file = Vec::new();
        reader.read_to_end(&mut file).await.map_err(|e| {
            tracing::error!("Failed to read document stream: {}", e);
            ApiError::from(e)
        })?;

        self.upload_document(file, file_name, expiry, public, search)
            .await
    }

    /// POST the multipart form, retrying once on connect failure if enabled
    ///
    /// Only connection establishment is retried: nothing has reached the
    /// server at that point, so a retry cannot store the document twice.
    async fn send_upload(
        &self,
        token: &str,
        file: Bytes,
        file_name: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let max_attempts = if self.retry_on_connect_failure { 2 } else { 1 };
        let mut attempt = 1;

        loop {
            // Bytes clones share the buffer, so a retry does not copy the document
            let part = Part::stream_with_length(reqwest::Body::from(file.clone()), file.len() as u64)
                .file_name(file_name.to_string());
            let form = Form::new().part(FILE_FIELD, part);

            tracing::debug!(
                "Sending upload request to: {} (attempt {}/{})",
                self.upload_url,
                attempt,
                max_attempts
            );

            match self
                .client
                .post(&self.upload_url)
                .header(AUTHORIZATION_HEADER, token)
                .multipart(form)
                .send()
                .await
            {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() && attempt < max_attempts => {
                    tracing::warn!("Upload connection failed, retrying once: {}", e);
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to send upload request: {}", e);
                    return Err(ApiError::from(e));
                }
            }
        }
    }
}
