//! Cloudinary API client for the media library.
//!
//! # API Reference
//!
//! - Upload API: `https://api.cloudinary.com/v1_1/{cloud}/{resource_type}/upload`
//!   (signed: SHA-256 over the sorted parameters followed by the API secret)
//! - Destroy: `.../{resource_type}/destroy` (signed the same way)
//! - Admin API: `.../resources/{resource_type}` (HTTP basic auth)
//! - Delivery: `https://res.cloudinary.com/{cloud}/{resource_type}/upload/...`
//!
//! Uploads are validated against the allow-list in [`folio_core::media`]
//! before any bytes leave the server.

pub mod transform;

pub use transform::{Crop, Gravity, Transformation, delivery_url};

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::StatusCode;
use folio_core::media::validate_upload;
use folio_core::{MediaKind, UploadValidationError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::MediaConfig;

/// Upload and Admin API base URL.
const API_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Delivery (CDN) base URL.
const DELIVERY_BASE_URL: &str = "https://res.cloudinary.com";

/// Page size for library listings.
const LIST_PAGE_SIZE: u32 = 50;

/// Errors that can occur when interacting with the media CDN.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The file was refused before upload.
    #[error("invalid upload: {0}")]
    Validation(#[from] UploadValidationError),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the CDN.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unauthorized (invalid API key or secret).
    #[error("Unauthorized: invalid API credentials")]
    Unauthorized,
}

impl MediaError {
    /// Message for the toast notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => match err {
                UploadValidationError::Empty => "The selected file is empty.".to_string(),
                UploadValidationError::UnsupportedType(_) => {
                    "Unsupported file type. Use JPEG, PNG, GIF, WebP, SVG, AVIF, MP4, WebM or MOV."
                        .to_string()
                }
                UploadValidationError::ExtensionMismatch { .. } => {
                    "The file extension does not match its type.".to_string()
                }
                UploadValidationError::TooLarge { kind, max_mb } => {
                    let noun = match kind {
                        MediaKind::Image => "Images",
                        MediaKind::Video => "Videos",
                    };
                    format!("{noun} must be {max_mb} MB or smaller.")
                }
            },
            Self::Http(_) => "Could not reach the media service. Check your connection.".to_string(),
            Self::RateLimited(_) => {
                "The media service is busy. Please wait a moment and try again.".to_string()
            }
            Self::NotFound(_) => "That file no longer exists in the media library.".to_string(),
            Self::Unauthorized => {
                "The media service rejected our credentials. Contact the site owner.".to_string()
            }
            Self::Api { .. } | Self::Parse(_) => {
                "The media service returned an error. Please try again.".to_string()
            }
        }
    }

    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::Validation(UploadValidationError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Validation(UploadValidationError::UnsupportedType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Http(_) | Self::Api { .. } | Self::Parse(_) | Self::Unauthorized => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    pub(crate) const fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Parse(_) | Self::Unauthorized)
    }
}

/// An asset in the media library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    pub public_id: String,
    pub resource_type: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Seconds, videos only.
    #[serde(default)]
    pub duration: Option<f64>,
    pub secure_url: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One page of a library listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaPage {
    pub resources: Vec<MediaAsset>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Cloudinary API client.
#[derive(Clone)]
pub struct CloudinaryClient {
    inner: Arc<CloudinaryClientInner>,
}

struct CloudinaryClientInner {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
    folder: String,
}

impl CloudinaryClient {
    /// Create a new Cloudinary API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &MediaConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(CloudinaryClientInner {
                client,
                cloud_name: config.cloud_name.clone(),
                api_key: config.api_key.clone(),
                api_secret: config.api_secret.clone(),
                folder: config.folder.clone(),
            }),
        })
    }

    /// Folder uploads land in.
    #[must_use]
    pub fn folder(&self) -> &str {
        &self.inner.folder
    }

    fn api_url(&self, path: &str) -> String {
        format!("{API_BASE_URL}/{}/{path}", self.inner.cloud_name)
    }

    /// Signed parameter set: `params` plus `api_key`, `signature` and
    /// `signature_algorithm`.
    fn signed(&self, mut params: BTreeMap<&'static str, String>) -> BTreeMap<&'static str, String> {
        let signature = sign_params(&params, &self.inner.api_secret);
        params.insert("api_key", self.inner.api_key.clone());
        params.insert("signature", signature);
        params.insert("signature_algorithm", "sha256".to_string());
        params
    }

    /// Validate and upload a file into the configured folder.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Validation`] without contacting the CDN if the
    /// file is refused, or an API error if the upload fails.
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<MediaAsset, MediaError> {
        let kind = validate_upload(file_name, content_type, bytes.len() as u64)?;

        let mut params = BTreeMap::new();
        params.insert("folder", self.inner.folder.clone());
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = self
            .signed(params)
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (key, value)| {
                form.text(key, value)
            })
            .part("file", part);

        let url = self.api_url(&format!("{}/upload", kind.resource_type()));
        let response = self.inner.client.post(&url).multipart(form).send().await?;
        let asset: MediaAsset = self.handle_response(response).await?;

        tracing::info!(public_id = %asset.public_id, "Media uploaded");
        Ok(asset)
    }

    /// Delete an asset.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::NotFound`] if the CDN has no such asset.
    #[tracing::instrument(skip(self))]
    pub async fn destroy(&self, kind: MediaKind, public_id: &str) -> Result<(), MediaError> {
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());

        let url = self.api_url(&format!("{}/destroy", kind.resource_type()));
        let response = self
            .inner
            .client
            .post(&url)
            .form(&self.signed(params))
            .send()
            .await?;
        let body: DestroyResponse = self.handle_response(response).await?;

        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => Err(MediaError::NotFound(public_id.to_string())),
            other => Err(MediaError::Api {
                status: 200,
                message: format!("unexpected destroy result: {other}"),
            }),
        }
    }

    /// List assets in the configured folder, newest first.
    ///
    /// # Errors
    ///
    /// Returns an API error if the listing fails.
    #[tracing::instrument(skip(self))]
    pub async fn list(
        &self,
        kind: MediaKind,
        cursor: Option<&str>,
    ) -> Result<MediaPage, MediaError> {
        let mut url = url::Url::parse(&self.api_url(&format!("resources/{}", kind.resource_type())))
            .map_err(|e| MediaError::Parse(format!("invalid API URL: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("type", "upload")
                .append_pair("prefix", &format!("{}/", self.inner.folder))
                .append_pair("max_results", &LIST_PAGE_SIZE.to_string());
            if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
                query.append_pair("next_cursor", cursor);
            }
        }

        let response = self
            .inner
            .client
            .get(url)
            .basic_auth(&self.inner.api_key, Some(self.inner.api_secret.expose_secret()))
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Delivery URL for an asset with a transformation applied.
    #[must_use]
    pub fn transformed_url(
        &self,
        kind: MediaKind,
        public_id: &str,
        transformation: &Transformation,
    ) -> String {
        delivery_url(
            DELIVERY_BASE_URL,
            &self.inner.cloud_name,
            kind,
            public_id,
            transformation,
        )
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, MediaError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| MediaError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(self.parse_error(response).await)
    }

    /// Parse error response from the CDN.
    async fn parse_error(&self, response: reqwest::Response) -> MediaError {
        let status = response.status().as_u16();

        // Cloudinary uses 420 for rate limiting on the Admin API
        if status == 429 || status == 420 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return MediaError::RateLimited(retry_after);
        }

        if status == 401 || status == 403 {
            return MediaError::Unauthorized;
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|envelope| envelope.error.message)
            .unwrap_or(text);

        if status == 404 {
            return MediaError::NotFound(message);
        }

        MediaError::Api { status, message }
    }
}

impl std::fmt::Debug for CloudinaryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryClient")
            .field("cloud_name", &self.inner.cloud_name)
            .field("folder", &self.inner.folder)
            .finish_non_exhaustive()
    }
}

/// `k1=v1&k2=v2` over the parameters in key order.
fn string_to_sign(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Hex SHA-256 of the string-to-sign followed by the API secret.
fn sign_params(params: &BTreeMap<&str, String>, api_secret: &SecretString) -> String {
    let mut hasher = Sha256::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(api_secret.expose_secret().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> CloudinaryClient {
        CloudinaryClient::new(&MediaConfig {
            cloud_name: "folio-demo".to_string(),
            api_key: "123456789012345".to_string(),
            api_secret: SecretString::from("abcd"),
            folder: "portfolio".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn string_to_sign_is_sorted() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        params.insert("folder", "portfolio".to_string());
        params.insert("public_id", "sample".to_string());
        assert_eq!(
            string_to_sign(&params),
            "folder=portfolio&public_id=sample&timestamp=1315060510"
        );
    }

    #[test]
    fn signature_is_hex_sha256_of_params_then_secret() {
        // Empty parameter set: the digest covers only the secret.
        let signature = sign_params(&BTreeMap::new(), &SecretString::from("abc"));
        assert_eq!(
            signature,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn signed_params_exclude_key_from_signature() {
        let client = client();
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        let expected = sign_params(&params, &SecretString::from("abcd"));

        let signed = client.signed(params);
        assert_eq!(signed["signature"], expected);
        assert_eq!(signed["api_key"], "123456789012345");
        assert_eq!(signed["signature_algorithm"], "sha256");
    }

    #[tokio::test]
    async fn invalid_upload_is_refused_before_network() {
        let err = client()
            .upload("notes.pdf", "application/pdf", vec![1, 2, 3])
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Validation(_)));
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn too_large_message_names_limit() {
        let err = MediaError::Validation(UploadValidationError::TooLarge {
            kind: MediaKind::Video,
            max_mb: 100,
        });
        assert_eq!(err.user_message(), "Videos must be 100 MB or smaller.");
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn transformed_url_uses_cloud_name() {
        let url = client().transformed_url(
            MediaKind::Image,
            "portfolio/cover",
            &Transformation::thumbnail(),
        );
        assert!(url.starts_with("https://res.cloudinary.com/folio-demo/image/upload/w_300,"));
        assert!(url.ends_with("/portfolio/cover"));
    }

    #[test]
    fn debug_hides_secret() {
        assert!(!format!("{:?}", client()).contains("abcd"));
    }
}
