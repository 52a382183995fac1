//! Minimal Mastodon REST client (media upload, media status, status post).

use std::path::Path;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::{Error, Result};

/// Remote operations the upload and dispatch pipeline depends on.
#[async_trait]
pub trait MastodonApi: Send + Sync {
    /// Upload a media file. Fails when the instance rejects the file.
    async fn submit_media(
        &self,
        file: &Path,
        description: Option<&str>,
        synchronous: bool,
    ) -> Result<MediaAttachment>;

    /// Fetch the current processing state of an uploaded media object.
    async fn poll_media(&self, id: &str) -> Result<MediaAttachment>;

    /// Publish a status.
    async fn submit_post(&self, request: &StatusRequest) -> Result<Status>;
}

/// Media object as returned by `/api/v{1,2}/media`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaAttachment {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Null until the instance has finished processing the file.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl MediaAttachment {
    pub fn is_ready(&self) -> bool {
        self.url.is_some()
    }
}

/// Post visibility. Notifications are always direct messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Direct,
}

/// Body of `POST /api/v1/statuses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRequest {
    pub status: String,
    pub visibility: Visibility,
    /// `None` omits the field entirely; `Some(vec![])` sends an empty list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spoiler_text: Option<String>,
    pub sensitive: bool,
}

/// Posted status (only the fields we report on).
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
}

#[derive(Debug, Clone)]
pub struct MastodonClient {
    http: Client,
    access_token: String,
    base_url: String,
}

impl MastodonClient {
    /// Create client from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base_url, &config.credentials.access_token)
    }

    /// Create client for an instance with the given access token.
    pub fn new<S1: Into<String>, S2: Into<String>>(base_url: S1, access_token: S2) -> Result<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(Error::InvalidConfig("access_token is empty".to_string()));
        }

        let http = Client::builder()
            .user_agent(format!("tootnotify/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::MastodonError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            access_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Read the body and decode it, mapping non-2xx responses to `MastodonApi`.
    async fn decode<D: for<'de> Deserialize<'de>>(response: Response) -> Result<D> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::MastodonError(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            return Err(Error::MastodonApi {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            Error::SerializationError(format!("unexpected Mastodon response: {} ({})", text, e))
        })
    }
}

#[async_trait]
impl MastodonApi for MastodonClient {
    async fn submit_media(
        &self,
        file: &Path,
        description: Option<&str>,
        synchronous: bool,
    ) -> Result<MediaAttachment> {
        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("media")
            .to_string();
        let mime = mime_guess::from_path(file).first_or_octet_stream();

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())
            .map_err(|e| Error::InvalidArgument(format!("bad MIME type {}: {}", mime, e)))?;

        let mut form = multipart::Form::new().part("file", part);
        if let Some(description) = description {
            form = form.text("description", description.to_string());
        }

        // v1 processes the upload before answering; v2 may answer 202 while processing.
        let path = if synchronous {
            "/api/v1/media"
        } else {
            "/api/v2/media"
        };

        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn poll_media(&self, id: &str) -> Result<MediaAttachment> {
        // 206 Partial Content means still processing; the body is still a media object.
        let response = self
            .http
            .get(self.endpoint(&format!("/api/v1/media/{}", id)))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn submit_post(&self, request: &StatusRequest) -> Result<Status> {
        let response = self
            .http
            .post(self.endpoint("/api/v1/statuses"))
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await?;

        Self::decode(response).await
    }
}
