//! REST API client for the Marble HTTP endpoints.
//!
//! Wraps media upload, world generation, operation status and world
//! metadata using [`reqwest`]. Every request carries the `WLT-Api-Key`
//! header.

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tourforge_core::config::VendorConfig;
use tourforge_core::job::JobStatus;
use tourforge_core::media::MediaPayload;

use crate::schema::{self, SchemaError};

/// Path prefix of the targeted API revision.
pub const API_PREFIX: &str = "/marble/v1";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "WLT-Api-Key";

/// Multipart field name for uploaded media.
pub const MEDIA_FIELD: &str = "file";

/// HTTP client for the Marble API.
///
/// Cheap to share behind an `Arc`; the inner [`reqwest::Client`] pools
/// connections.
pub struct MarbleApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Errors from the Marble REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum MarbleApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Marble returned a non-2xx status code.
    #[error("Marble API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body, verbatim.
        body: String,
    },

    /// A 2xx response whose body did not have the expected shape.
    #[error(transparent)]
    Malformed(#[from] SchemaError),

    /// An id that cannot be used as a single path segment.
    #[error("Invalid {kind} id '{id}'")]
    InvalidId { kind: &'static str, id: String },

    /// The configured base URL cannot carry a path.
    #[error("Invalid Marble base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl MarbleApi {
    /// Create a client from vendor configuration.
    pub fn new(config: &VendorConfig) -> Result<Self, MarbleApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(
            client,
            config.api_base_url.clone(),
            config.api_key.clone(),
        ))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// API base URL (e.g. `https://api.worldlabs.ai`).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload one media file.
    ///
    /// Sends a multipart `POST /media` and returns the vendor media id.
    pub async fn upload_media(&self, payload: &MediaPayload) -> Result<String, MarbleApiError> {
        let part = Part::bytes(payload.bytes.clone())
            .file_name(payload.filename.clone())
            .mime_str(payload.effective_mime_type())?;
        let form = Form::new().part(MEDIA_FIELD, part);

        tracing::debug!(
            filename = %payload.filename,
            bytes = payload.bytes.len(),
            mime = payload.effective_mime_type(),
            "Uploading media to Marble",
        );

        let response = self
            .client
            .post(self.url("/media"))
            .header(API_KEY_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let body = Self::parse_json(response, "media upload").await?;
        Ok(schema::parse_media_id(&body)?)
    }

    /// Start a world generation job.
    ///
    /// Sends `POST /worlds/generate` with a body built by
    /// [`crate::payload::build_generate_payload`] and returns the
    /// operation id.
    pub async fn generate_world(&self, body: &Value) -> Result<String, MarbleApiError> {
        let response = self
            .client
            .post(self.url("/worlds/generate"))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        let body = Self::parse_json(response, "world generation").await?;
        Ok(schema::parse_operation_id(&body)?)
    }

    /// Fetch the current status of an operation via
    /// `GET /operations/{id}`.
    pub async fn get_operation(&self, operation_id: &str) -> Result<JobStatus, MarbleApiError> {
        let response = self
            .client
            .get(self.resource_url("operations", "operation", operation_id)?)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let body = Self::parse_json(response, "operation status").await?;
        Ok(schema::parse_operation(&body)?)
    }

    /// Fetch world metadata via `GET /worlds/{id}`.
    pub async fn get_world(&self, world_id: &str) -> Result<Value, MarbleApiError> {
        let response = self
            .client
            .get(self.resource_url("worlds", "world", world_id)?)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        Self::parse_json(response, "world metadata").await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    /// `{base}/marble/v1/{collection}/{id}` with `id` percent-encoded as
    /// one segment.
    fn resource_url(
        &self,
        collection: &str,
        kind: &'static str,
        id: &str,
    ) -> Result<reqwest::Url, MarbleApiError> {
        if matches!(id.trim(), "" | "." | "..") {
            return Err(MarbleApiError::InvalidId {
                kind,
                id: id.to_string(),
            });
        }

        let mut url = reqwest::Url::parse(&self.url(""))
            .map_err(|_| MarbleApiError::InvalidBaseUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|()| MarbleApiError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push(collection)
            .push(id);
        Ok(url)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`MarbleApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, MarbleApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MarbleApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Read a successful body as JSON, keeping the raw text when it is
    /// not JSON.
    async fn parse_json(
        response: reqwest::Response,
        context: &'static str,
    ) -> Result<Value, MarbleApiError> {
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| MarbleApiError::Malformed(SchemaError::not_json(context, text.clone(), &e)))
    }
}
